//! Maps the blog's logical pages onto URLs and output files. Every route is a
//! directory-style path relative to the site root (e.g., `category/rust/`)
//! and is rendered as `index.html` within the corresponding output directory.
//! Page `n > 1` of a paginated route lives at `{route}page/{n}/`.

use std::path::{Path, PathBuf};
use url::{ParseError, Url};

/// The name of the file rendered for each route.
pub const INDEX_FILE: &str = "index.html";

/// A logical page of the blog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// The home page, listing all posts.
    Home,

    /// The posts created in a given month.
    Archive { year: i32, month: u32 },

    /// The posts filed under the category with the given slug.
    Category(String),

    /// The posts carrying the tag with the given slug.
    Tag(String),

    /// The detail page for the post with the given ID.
    Post(String),
}

impl Route {
    /// Returns the route's path relative to the site root. The path is empty
    /// for [`Route::Home`] and ends in a trailing slash otherwise, so that it
    /// can be safely passed to [`Url::join`].
    pub fn path(&self) -> String {
        match self {
            Route::Home => String::new(),
            Route::Archive { year, month } => {
                format!("archives/{}/{}/", year, month)
            }
            Route::Category(slug) => format!("category/{}/", slug),
            Route::Tag(slug) => format!("tag/{}/", slug),
            Route::Post(id) => format!("post/{}/", id),
        }
    }

    /// Returns the path of page `page` (1-indexed) of the route relative to
    /// the site root. Page 1 is the route itself.
    pub fn page_path(&self, page: usize) -> String {
        match page {
            0 | 1 => self.path(),
            _ => format!("{}page/{}/", self.path(), page),
        }
    }

    /// Returns the route's URL given the `site_root`, which must end in a
    /// trailing slash.
    pub fn url(&self, site_root: &Url) -> Result<Url, ParseError> {
        site_root.join(&self.path())
    }

    /// Returns the URL of page `page` of the route. See [`Route::page_path`].
    pub fn page_url(&self, site_root: &Url, page: usize) -> Result<Url, ParseError> {
        site_root.join(&self.page_path(page))
    }

    /// Returns the file to which page `page` of the route is rendered.
    pub fn page_file(&self, output_directory: &Path, page: usize) -> PathBuf {
        output_directory.join(self.page_path(page)).join(INDEX_FILE)
    }

    /// Returns the file to which the route is rendered.
    pub fn file(&self, output_directory: &Path) -> PathBuf {
        self.page_file(output_directory, 1)
    }
}

/// The top-level output directories owned by generated routes. These are
/// removed before each build.
pub const GENERATED_DIRECTORIES: &[&str] =
    &["post", "page", "archives", "category", "tag"];

#[cfg(test)]
mod test {
    use super::*;

    struct TestCase {
        route: Route,
        page: usize,
        wanted_url: &'static str,
        wanted_file: &'static str,
    }

    #[test]
    fn test_routes() -> Result<(), ParseError> {
        let site_root = Url::parse("https://example.org/blog/")?;
        let output_directory = Path::new("/tmp/site");

        for tc in &[
            TestCase {
                route: Route::Home,
                page: 1,
                wanted_url: "https://example.org/blog/",
                wanted_file: "/tmp/site/index.html",
            },
            TestCase {
                route: Route::Home,
                page: 3,
                wanted_url: "https://example.org/blog/page/3/",
                wanted_file: "/tmp/site/page/3/index.html",
            },
            TestCase {
                route: Route::Archive {
                    year: 2017,
                    month: 3,
                },
                page: 1,
                wanted_url: "https://example.org/blog/archives/2017/3/",
                wanted_file: "/tmp/site/archives/2017/3/index.html",
            },
            TestCase {
                route: Route::Category(String::from("rust")),
                page: 2,
                wanted_url: "https://example.org/blog/category/rust/page/2/",
                wanted_file: "/tmp/site/category/rust/page/2/index.html",
            },
            TestCase {
                route: Route::Tag(String::from("web-dev")),
                page: 1,
                wanted_url: "https://example.org/blog/tag/web-dev/",
                wanted_file: "/tmp/site/tag/web-dev/index.html",
            },
            TestCase {
                route: Route::Post(String::from("hello-world")),
                page: 1,
                wanted_url: "https://example.org/blog/post/hello-world/",
                wanted_file: "/tmp/site/post/hello-world/index.html",
            },
        ] {
            assert_eq!(
                tc.wanted_url,
                tc.route.page_url(&site_root, tc.page)?.as_str()
            );
            assert_eq!(
                PathBuf::from(tc.wanted_file),
                tc.route.page_file(output_directory, tc.page)
            );
        }
        Ok(())
    }

    #[test]
    fn test_first_page_is_route() -> Result<(), ParseError> {
        let site_root = Url::parse("https://example.org/")?;
        let route = Route::Category(String::from("misc"));
        assert_eq!(route.url(&site_root)?, route.page_url(&site_root, 1)?);
        assert_eq!(
            route.file(Path::new("out")),
            route.page_file(Path::new("out"), 1)
        );
        Ok(())
    }
}
