//! Defines the [`Post`] type and the template values built from it (see
//! [`Post::to_value`] and [`Post::summarize`]). Posts are parsed from source
//! files by [`crate::parser::Parser`].

use crate::category::Category;
use crate::tag::Tag;
use chrono::{Datelike, NaiveDateTime};
use gtmpl_value::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

/// The format in which dates are presented to templates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A blog post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The path of the source file relative to the posts directory, less the
    /// `.md` extension.
    pub id: String,

    /// The output location for the post's detail page.
    pub file_path: PathBuf,

    /// The URL for the post's detail page.
    pub url: Url,

    pub title: String,

    /// When the post was first published. Posts are ordered by this field,
    /// most recent first.
    pub created: NaiveDateTime,

    /// When the post was last modified.
    pub modified: NaiveDateTime,

    pub author: String,

    pub category: Category,

    /// The tags associated with the post, unique by slug, in frontmatter
    /// order.
    pub tags: Vec<Tag>,

    /// A short summary shown on index pages.
    pub excerpt: String,

    /// The rendered HTML body.
    pub body: String,

    /// The rendered table of contents. Empty if the body has no headings.
    pub toc: String,
}

impl Post {
    /// The year and month in which the post was created.
    pub fn archive_month(&self) -> (i32, u32) {
        (self.created.year(), self.created.month())
    }

    /// Converts the post into a template [`Value`] including the fields that
    /// are only needed on the post's own page (`body` and `toc`).
    pub fn to_value(&self) -> Value {
        let mut m = self.fields();
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        m.insert("toc".to_owned(), Value::String(self.toc.clone()));
        Value::Object(m)
    }

    /// Converts the post into a template [`Value`] suitable for index pages.
    /// Unlike [`Post::to_value`], the body and table of contents are omitted.
    pub fn summarize(&self) -> Value {
        Value::Object(self.fields())
    }

    fn fields(&self) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(self.id.clone()));
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "date".to_owned(),
            Value::String(self.created.format(DATE_FORMAT).to_string()),
        );
        m.insert(
            "modified".to_owned(),
            Value::String(self.modified.format(DATE_FORMAT).to_string()),
        );
        m.insert("year".to_owned(), Value::from(self.created.year() as i64));
        m.insert("month".to_owned(), Value::from(self.created.month() as i64));
        m.insert("author".to_owned(), Value::String(self.author.clone()));
        m.insert("category".to_owned(), (&self.category).into());
        m.insert(
            "tags".to_owned(),
            Value::Array(self.tags.iter().map(|t| t.into()).collect()),
        );
        m.insert("excerpt".to_owned(), Value::String(self.excerpt.clone()));
        m
    }
}

/// Sorts posts most-recent first. Posts created at the same moment are
/// ordered by ID so that builds are reproducible.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
}
