//! Indexes, paginates, templates, and writes the blog's HTML pages to disk.
//!
//! Posts are grouped into indices: the home index holding every post, one
//! index per archive month, one per category and one per tag. Each index is
//! split into pages of `index_page_size` posts, and every index page carries
//! the [`PageWindow`] used to render its pagination control.

use crate::pagination::{self, compute_window, PageWindow};
use crate::post::Post;
use crate::route::Route;
use gtmpl::{Template, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Responsible for indexing, templating, and writing HTML pages to disk from
/// [`Post`] sources.
pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for index pages.
    pub index_template: &'a Template,

    /// The base URL for all pages. Must end in a trailing slash.
    pub site_root: &'a Url,

    /// The directory in which pages are written. Each page is written to the
    /// `index.html` file of its route's directory (see [`Route`]).
    pub output_directory: &'a Path,

    /// The number of posts per index page.
    pub index_page_size: usize,

    /// Values made available to every template alongside the page's own
    /// values, e.g. the site title and the sidebar.
    pub globals: &'a HashMap<String, Value>,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            for (key, global) in self.globals {
                obj.entry(key.clone()).or_insert_with(|| global.clone());
            }
        }
        debug!(path = %page.file_path.display(), "writing page");
        page.template.execute(
            &mut std::fs::File::create(&page.file_path)?,
            &gtmpl::Context::from(value)?,
        )?;
        Ok(())
    }

    /// Takes a slice of [`Post`], indexes it, and writes post and index
    /// pages to disk. Returns the number of pages written.
    pub fn write_posts(&self, posts: &[Post]) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let pages = pages(
            posts,
            self.site_root,
            self.output_directory,
            self.index_page_size,
            self.posts_template,
            self.index_template,
        )?;
        for page in &pages {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(page)?;
        }
        info!(pages = pages.len(), "wrote pages");
        Ok(pages.len())
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted to
/// a [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page: a post for post pages, an array of post
    /// summaries for index pages.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// Page-specific values besides `item`, `prev` and `next`.
    fields: HashMap<String, Value>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item`, `prev`, and `next` plus the page's other fields.
    fn to_value(&self) -> Value {
        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m = self.fields.clone();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        Value::Object(m)
    }
}

/// Creates all of the index and post [`Page`]s for a set of [`Post`]s. See
/// [`Writer`] for a description of arguments.
fn pages<'a>(
    posts: &[Post],
    site_root: &Url,
    output_directory: &Path,
    index_page_size: usize,
    posts_template: &'a Template,
    index_template: &'a Template,
) -> Result<Vec<Page<'a>>> {
    let mut pages = Vec::new();
    for index in index_posts(posts) {
        pages.extend(index.to_pages(
            site_root,
            output_directory,
            index_page_size,
            index_template,
        )?);
    }
    pages.extend(post_pages(posts, posts_template));
    Ok(pages)
}

/// Creates the detail [`Page`] for each post. `prev` links to the newer post
/// and `next` to the older one.
fn post_pages<'p, 't: 'p>(
    posts: &'p [Post],
    template: &'t Template,
) -> impl Iterator<Item = Page<'t>> + 'p {
    posts.iter().enumerate().map(move |(i, post)| Page {
        item: post.to_value(),
        file_path: post.file_path.clone(),
        prev: match i {
            0 => None,
            _ => Some(posts[i - 1].url.clone()),
        },
        next: posts.get(i + 1).map(|p| p.url.clone()),
        fields: HashMap::new(),
        template,
    })
}

/// `Index` represents a list of [`Post`]s rendered as a paginated series of
/// index pages under a single [`Route`].
struct Index<'a> {
    route: Route,

    /// The heading shown above the list, or `None` for the home page.
    title: Option<String>,

    /// The posts in the index, most recent first.
    posts: Vec<&'a Post>,
}

impl<'a> Index<'a> {
    fn new(route: Route, title: Option<String>) -> Index<'a> {
        Index {
            route,
            title,
            posts: Vec::new(),
        }
    }

    /// The number of pages needed to list the index's posts. An empty index
    /// still renders a single (empty) page.
    fn total_pages(&self, index_page_size: usize) -> usize {
        let index_page_size = index_page_size.max(1);
        ((self.posts.len() + index_page_size - 1) / index_page_size).max(1)
    }

    fn kind(&self) -> &'static str {
        match self.route {
            Route::Home => "home",
            Route::Archive { .. } => "archive",
            Route::Category(_) => "category",
            Route::Tag(_) => "tag",
            Route::Post(_) => "post",
        }
    }

    /// Converts the index to a list of index pages. `index_page_size` and
    /// `index_template` represent the number of posts per page and the
    /// template to apply to the pages respectively.
    fn to_pages<'t>(
        &self,
        site_root: &Url,
        output_directory: &Path,
        index_page_size: usize,
        index_template: &'t Template,
    ) -> Result<Vec<Page<'t>>> {
        let index_page_size = index_page_size.max(1);
        let total_pages = self.total_pages(index_page_size);
        let is_paginated = total_pages > 1;

        let mut pages = Vec::with_capacity(total_pages);
        for page in 1..=total_pages {
            let start = (page - 1) * index_page_size;
            let end = (start + index_page_size).min(self.posts.len());
            let chunk = &self.posts[start.min(end)..end];

            let mut fields: HashMap<String, Value> = HashMap::new();
            fields.insert(
                "title".to_owned(),
                match &self.title {
                    Some(title) => Value::String(title.clone()),
                    None => Value::Nil,
                },
            );
            fields.insert("kind".to_owned(), Value::String(self.kind().to_owned()));
            fields.insert("page".to_owned(), Value::from(page as i64));
            fields.insert("total_pages".to_owned(), Value::from(total_pages as i64));
            fields.insert(
                "pagination".to_owned(),
                match compute_window(page, total_pages, is_paginated)? {
                    Some(window) => window_to_value(&window, &self.route, site_root)?,
                    None => Value::Nil,
                },
            );

            pages.push(Page {
                item: Value::Array(chunk.iter().map(|p| p.summarize()).collect()),
                file_path: self.route.page_file(output_directory, page),
                prev: match page {
                    1 => None,
                    _ => Some(self.route.page_url(site_root, page - 1)?),
                },
                next: match page < total_pages {
                    false => None,
                    true => Some(self.route.page_url(site_root, page + 1)?),
                },
                fields,
                template: index_template,
            });
        }
        Ok(pages)
    }
}

/// Converts a [`PageWindow`] into a template [`Value`]. Page numbers are
/// paired with their URLs as `{number, url}` objects.
fn window_to_value(window: &PageWindow, route: &Route, site_root: &Url) -> Result<Value> {
    let link = |number: usize| -> Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("number".to_owned(), Value::from(number as i64));
        m.insert(
            "url".to_owned(),
            Value::String(route.page_url(site_root, number)?.to_string()),
        );
        Ok(Value::Object(m))
    };
    let links = |numbers: &[usize]| -> Result<Value> {
        Ok(Value::Array(
            numbers.iter().map(|&n| link(n)).collect::<Result<Vec<Value>>>()?,
        ))
    };

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("current".to_owned(), Value::from(window.current_page as i64));
    m.insert("total".to_owned(), Value::from(window.total_pages as i64));
    m.insert("left".to_owned(), links(&window.left_pages)?);
    m.insert("right".to_owned(), links(&window.right_pages)?);
    m.insert("first".to_owned(), link(1)?);
    m.insert("last".to_owned(), link(window.total_pages)?);
    m.insert("show_first".to_owned(), Value::Bool(window.show_first));
    m.insert("show_last".to_owned(), Value::Bool(window.show_last));
    m.insert("left_ellipsis".to_owned(), Value::Bool(window.left_ellipsis));
    m.insert("right_ellipsis".to_owned(), Value::Bool(window.right_ellipsis));
    Ok(Value::Object(m))
}

/// Indexes a list of [`Post`] objects, which must already be sorted. Returns
/// the home index followed by the archive indices (most recent month first),
/// then the category and tag indices in order of first appearance.
fn index_posts(posts: &[Post]) -> Vec<Index> {
    let mut home = Index::new(Route::Home, None);
    let mut archives: BTreeMap<(i32, u32), Index> = BTreeMap::new();
    let mut taxonomies: Vec<Index> = Vec::new();
    let mut positions: HashMap<Route, usize> = HashMap::new();

    let mut push = |route: Route, title: String, post| {
        let i = *positions.entry(route.clone()).or_insert_with(|| {
            taxonomies.push(Index::new(route, Some(title)));
            taxonomies.len() - 1
        });
        taxonomies[i].posts.push(post);
    };

    for post in posts {
        home.posts.push(post);

        let (year, month) = post.archive_month();
        archives
            .entry((year, month))
            .or_insert_with(|| {
                Index::new(
                    Route::Archive { year, month },
                    Some(format!("Archives: {}-{:02}", year, month)),
                )
            })
            .posts
            .push(post);

        push(
            post.category.route(),
            format!("Category: {}", post.category.name),
            post,
        );
        for tag in &post.tags {
            push(tag.route(), format!("Tag: {}", tag.name), post);
        }
    }

    let mut indices = vec![home];
    indices.extend(archives.into_iter().rev().map(|(_, index)| index));
    indices.extend(taxonomies);
    indices
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error computing a page's pagination window.
    Pagination(pagination::Error),

    /// An error building a page URL.
    UrlParse(url::ParseError),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<pagination::Error> for Error {
    fn from(err: pagination::Error) -> Error {
        Error::Pagination(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Pagination(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Pagination(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
