//! The sidebar widgets shown on every page: the most recent posts, the
//! months in which posts were published, and the categories in use.

use crate::category::Category;
use crate::post::Post;
use crate::route::Route;
use gtmpl_value::Value;
use std::collections::{BTreeMap, HashMap};
use url::{ParseError, Url};

/// The number of recent posts shown when the project doesn't configure it.
pub const DEFAULT_RECENT_POSTS: usize = 5;

/// A month in which at least one post was published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
    pub num_posts: usize,
}

/// A category along with the number of posts filed under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCount<'a> {
    pub category: &'a Category,
    pub num_posts: usize,
}

/// Returns the `num` most recent posts. `posts` must already be sorted (see
/// [`crate::post::sort_posts`]).
pub fn recent_posts(posts: &[Post], num: usize) -> &[Post] {
    &posts[..num.min(posts.len())]
}

/// Returns the distinct months in which posts were created, most recent
/// first.
pub fn archives(posts: &[Post]) -> Vec<ArchiveMonth> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for post in posts {
        *months.entry(post.archive_month()).or_insert(0) += 1;
    }
    months
        .into_iter()
        .rev()
        .map(|((year, month), num_posts)| ArchiveMonth {
            year,
            month,
            num_posts,
        })
        .collect()
}

/// Returns every category with at least one post, ordered by name.
pub fn categories(posts: &[Post]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, CategoryCount> = HashMap::new();
    for post in posts {
        counts
            .entry(post.category.slug.as_str())
            .or_insert(CategoryCount {
                category: &post.category,
                num_posts: 0,
            })
            .num_posts += 1;
    }
    let mut categories: Vec<CategoryCount> = counts.into_iter().map(|(_, c)| c).collect();
    categories.sort_by(|a, b| {
        a.category
            .name
            .to_lowercase()
            .cmp(&b.category.name.to_lowercase())
            .then_with(|| a.category.slug.cmp(&b.category.slug))
    });
    categories
}

/// Builds the `sidebar` template value: an object with `recent_posts`,
/// `archives` and `categories` arrays.
pub fn sidebar(posts: &[Post], num_recent: usize, site_root: &Url) -> Result<Value, ParseError> {
    let mut archive_values = Vec::new();
    for archive in archives(posts) {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("year".to_owned(), Value::from(archive.year as i64));
        m.insert("month".to_owned(), Value::from(archive.month as i64));
        m.insert("num_posts".to_owned(), Value::from(archive.num_posts as i64));
        let route = Route::Archive {
            year: archive.year,
            month: archive.month,
        };
        m.insert("url".to_owned(), Value::String(route.url(site_root)?.to_string()));
        archive_values.push(Value::Object(m));
    }

    let category_values = categories(posts)
        .into_iter()
        .map(|c| {
            let mut value = Value::from(c.category);
            if let Value::Object(m) = &mut value {
                m.insert("num_posts".to_owned(), Value::from(c.num_posts as i64));
            }
            value
        })
        .collect();

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "recent_posts".to_owned(),
        Value::Array(recent_posts(posts, num_recent).iter().map(Post::summarize).collect()),
    );
    m.insert("archives".to_owned(), Value::Array(archive_values));
    m.insert("categories".to_owned(), Value::Array(category_values));
    Ok(Value::Object(m))
}
