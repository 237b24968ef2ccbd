//! Defines the [`Parser`] and [`Error`] types. Also defines the logic for
//! parsing posts from the file system into memory.

use std::{
    collections::HashSet,
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use walkdir::WalkDir;

use crate::{
    category::Category,
    markdown,
    post::{sort_posts, Post},
    route::Route,
    tag::Tag,
};

const MARKDOWN_EXTENSION: &str = "md";

/// The number of characters of plain text taken as the excerpt for posts
/// without an explicit `Excerpt`.
pub const EXCERPT_LENGTH: usize = 54;

const MAX_TITLE_LENGTH: usize = 70;
const MAX_EXCERPT_LENGTH: usize = 200;
const MAX_NAME_LENGTH: usize = 100;

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `site_root` is the base URL for all pages. Post, category and tag URLs
    /// are derived from it (see [`Route`]).
    site_root: &'a Url,

    /// `output_directory` is the directory in which the site is rendered.
    /// Post pages are rendered to `{output_directory}/post/{id}/index.html`.
    output_directory: &'a Path,

    /// The author attributed to posts whose frontmatter has no `Author`.
    default_author: &'a str,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(
        site_root: &'a Url,
        output_directory: &'a Path,
        default_author: &'a str,
    ) -> Parser<'a> {
        Parser {
            site_root,
            output_directory,
            default_author,
        }
    }

    /// Searches `source_directory` recursively for post files (extension =
    /// `.md`) and returns the parsed posts sorted by date (most recent
    /// first). Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `Title`, `Date`, `Category`, and
    ///    optionally `Modified`, `Tags`, `Author` and `Excerpt`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Hello, world!
    /// Date: 2021-04-16 09:30:00
    /// Category: Notes
    /// Tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(source_directory).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
            let entry = result?;
            if !entry.file_type().is_file()
                || entry.path().extension().map_or(true, |ext| ext != MARKDOWN_EXTENSION)
            {
                continue;
            }

            // strip_prefix() should never fail since `source_directory` is
            // the root of the walk
            let relative_path = entry
                .path()
                .strip_prefix(source_directory)
                .unwrap_or_else(|_| entry.path());
            posts.push(self.parse_post(entry.path(), relative_path)?);
        }

        sort_posts(&mut posts);
        Ok(posts)
    }

    fn parse_post(&self, path: &Path, relative_path: &Path) -> Result<Post> {
        let annotate = |e: Error| {
            Error::Annotated(format!("parsing post `{}`", relative_path.display()), Box::new(e))
        };

        let id = post_id(relative_path).map_err(annotate)?;
        debug!(id = %id, "parsing post");

        use std::io::Read;
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|e| annotate(Error::Io(e)))?;
        self.parse_source(&id, &contents).map_err(annotate)
    }

    /// Parses a single [`Post`] from its `id` and the contents of its source
    /// file.
    pub fn parse_source(&self, id: &str, input: &str) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find("\n---") {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                               // yaml_start
                    FENCE.len() + offset + 1,                  // yaml_stop
                    FENCE.len() + offset + 1 + FENCE.len(),    // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        check_length("Title", &frontmatter.title, MAX_TITLE_LENGTH)?;
        check_length("Category", &frontmatter.category, MAX_NAME_LENGTH)?;
        check_slug("Category", &frontmatter.category)?;

        let created = parse_date(&frontmatter.date)?;
        let modified = match &frontmatter.modified {
            Some(modified) => parse_date(modified)?,
            None => created,
        };

        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(frontmatter.tags.len());
        for name in &frontmatter.tags {
            check_length("Tags", name, MAX_NAME_LENGTH)?;
            check_slug("Tags", name)?;
            let tag = Tag::new(name, self.site_root)?;
            if seen.insert(tag.slug.clone()) {
                tags.push(tag);
            }
        }

        let rendered = markdown::render(&input[body_start..]);
        let excerpt = match frontmatter.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt,
            _ => markdown::excerpt(&rendered.text, EXCERPT_LENGTH),
        };
        if excerpt.chars().count() > MAX_EXCERPT_LENGTH {
            return Err(Error::FieldTooLong {
                field: "Excerpt",
                max: MAX_EXCERPT_LENGTH,
            });
        }

        let route = Route::Post(id.to_owned());
        Ok(Post {
            id: id.to_owned(),
            file_path: route.file(self.output_directory),
            url: route.url(self.site_root)?,
            title: frontmatter.title,
            created,
            modified,
            author: frontmatter
                .author
                .unwrap_or_else(|| self.default_author.to_owned()),
            category: Category::new(&frontmatter.category, self.site_root)?,
            tags,
            excerpt,
            body: rendered.html,
            toc: rendered.toc,
        })
    }
}

/// Derives a post's ID from the path of its source file relative to the
/// posts directory, e.g. `2021/hello.md` becomes `2021/hello`.
fn post_id(relative_path: &Path) -> Result<String> {
    let invalid = || InvalidFileNameError(relative_path.to_owned());
    let without_extension = relative_path.with_extension("");
    let components = without_extension
        .components()
        .map(|c| c.as_os_str().to_str().ok_or_else(invalid))
        .collect::<std::result::Result<Vec<&str>, _>>()?;
    if components.is_empty() {
        return Err(invalid().into());
    }
    Ok(components.join("/"))
}

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a frontmatter date. A bare date is taken to mean midnight.
fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map_or_else(
            || NaiveDateTime::parse_from_str(&format!("{} 00:00:00", input), DATE_TIME_FORMATS[0]),
            Ok,
        )
        .map_err(|err| Error::InvalidDate {
            input: input.to_owned(),
            err,
        })
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    let length = value.trim().chars().count();
    if length == 0 {
        return Err(Error::FieldEmpty(field));
    }
    if length > max {
        return Err(Error::FieldTooLong { field, max });
    }
    Ok(())
}

// Category and tag slugs name their index directories.
fn check_slug(field: &'static str, value: &str) -> Result<()> {
    if slug::slugify(value).is_empty() {
        return Err(Error::EmptySlug(field));
    }
    Ok(())
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    #[serde(rename = "Title")]
    pub title: String,

    /// The date the post was created.
    #[serde(rename = "Date")]
    pub date: String,

    /// The date the post was last modified.
    #[serde(default, rename = "Modified")]
    pub modified: Option<String>,

    /// The name of the post's category.
    #[serde(rename = "Category")]
    pub category: String,

    /// The tags associated with the post.
    #[serde(default, rename = "Tags")]
    pub tags: Vec<String>,

    #[serde(default, rename = "Author")]
    pub author: Option<String>,

    #[serde(default, rename = "Excerpt")]
    pub excerpt: Option<String>,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the `Date` or `Modified` field isn't a valid date.
    InvalidDate {
        input: String,
        err: chrono::ParseError,
    },

    /// Returned when a required frontmatter field is blank.
    FieldEmpty(&'static str),

    /// Returned when a frontmatter field exceeds its maximum length (in
    /// characters).
    FieldTooLong { field: &'static str, max: usize },

    /// Returned when a category or tag name has no characters that survive
    /// slugification, e.g. `???`.
    EmptySlug(&'static str),

    /// Returned when there is a problem parsing URLs.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate { input, err } => {
                write!(f, "invalid date `{}`: {}", input, err)
            }
            Error::FieldEmpty(field) => write!(f, "`{}` must not be empty", field),
            Error::FieldTooLong { field, max } => {
                write!(f, "`{}` must be at most {} characters", field, max)
            }
            Error::EmptySlug(field) => {
                write!(f, "`{}` must contain at least one letter or digit", field)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate { input: _, err } => Some(err),
            Error::FieldEmpty(_) => None,
            Error::FieldTooLong { .. } => None,
            Error::EmptySlug(_) => None,
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parser_fixture() -> (Url, PathBuf) {
        (
            Url::parse("https://example.com/").unwrap(),
            PathBuf::from("/tmp/site"),
        )
    }

    #[test]
    fn test_parse_source() -> Result<()> {
        let (site_root, output_directory) = parser_fixture();
        let parser = Parser::new(&site_root, &output_directory, "Site Author");
        let post = parser.parse_source(
            "hello",
            "---\nTitle: Hello\nDate: 2017-03-09 10:30:00\nCategory: Rust Notes\nTags: [Rust, rust, web]\n---\n# Hi\n\nToday is the first day.\n",
        )?;

        assert_eq!("hello", post.id);
        assert_eq!("Hello", post.title);
        assert_eq!("https://example.com/post/hello/", post.url.as_str());
        assert_eq!(PathBuf::from("/tmp/site/post/hello/index.html"), post.file_path);
        assert_eq!("2017-03-09 10:30:00", post.created.to_string());
        assert_eq!(post.created, post.modified);
        assert_eq!("Site Author", post.author);
        assert_eq!("rust-notes", post.category.slug);
        assert_eq!(
            vec!["rust", "web"],
            post.tags.iter().map(|t| t.slug.as_str()).collect::<Vec<_>>()
        );
        assert_eq!("Hi\nToday is the first day.", post.excerpt);
        assert!(post.body.contains("<h1 id=\"hi\">Hi</h1>"));
        assert!(post.toc.contains("href=\"#hi\""));
        Ok(())
    }

    #[test]
    fn test_parse_source_explicit_fields() -> Result<()> {
        let (site_root, output_directory) = parser_fixture();
        let parser = Parser::new(&site_root, &output_directory, "");
        let post = parser.parse_source(
            "notes/second",
            "---\nTitle: Second\nDate: 2017-04-01\nModified: 2017-04-02T08:00:00\nCategory: Misc\nAuthor: bob\nExcerpt: Hand written.\n---\nBody with --- inside.\n",
        )?;
        assert_eq!("2017-04-01 00:00:00", post.created.to_string());
        assert_eq!("2017-04-02 08:00:00", post.modified.to_string());
        assert_eq!("bob", post.author);
        assert_eq!("Hand written.", post.excerpt);
        assert_eq!("https://example.com/post/notes/second/", post.url.as_str());
        assert!(post.body.contains("Body with"));
        Ok(())
    }

    #[test]
    fn test_generated_excerpt_is_truncated() -> Result<()> {
        let (site_root, output_directory) = parser_fixture();
        let parser = Parser::new(&site_root, &output_directory, "");
        let body = "word ".repeat(40);
        let post = parser.parse_source(
            "long",
            &format!("---\nTitle: Long\nDate: 2017-04-01\nCategory: Misc\n---\n{}", body),
        )?;
        assert_eq!(EXCERPT_LENGTH, post.excerpt.chars().count());
        assert!(body.starts_with(&post.excerpt));
        Ok(())
    }

    #[test]
    fn test_parse_source_errors() {
        let (site_root, output_directory) = parser_fixture();
        let parser = Parser::new(&site_root, &output_directory, "");
        let long_title = "x".repeat(MAX_TITLE_LENGTH + 1);

        struct TestCase<'a> {
            input: String,
            check: &'a dyn Fn(&Error) -> bool,
        }

        for tc in &[
            TestCase {
                input: String::from("Title: Nope\n"),
                check: &|e: &Error| matches!(e, Error::FrontmatterMissingStartFence),
            },
            TestCase {
                input: String::from("---\nTitle: Nope\n"),
                check: &|e: &Error| matches!(e, Error::FrontmatterMissingEndFence),
            },
            TestCase {
                input: String::from("---\nTitle: [unclosed\n---\n"),
                check: &|e: &Error| matches!(e, Error::DeserializeYaml(_)),
            },
            TestCase {
                input: String::from("---\nTitle: Bad\nDate: yesterday\nCategory: Misc\n---\n"),
                check: &|e: &Error| matches!(e, Error::InvalidDate { .. }),
            },
            TestCase {
                input: String::from("---\nTitle: Blank\nDate: 2017-01-01\nCategory: \"  \"\n---\n"),
                check: &|e: &Error| matches!(e, Error::FieldEmpty("Category")),
            },
            TestCase {
                input: format!("---\nTitle: {}\nDate: 2017-01-01\nCategory: Misc\n---\n", long_title),
                check: &|e: &Error| matches!(e, Error::FieldTooLong { field: "Title", .. }),
            },
            TestCase {
                input: String::from("---\nTitle: Punct\nDate: 2017-01-01\nCategory: \"???\"\n---\n"),
                check: &|e: &Error| matches!(e, Error::EmptySlug("Category")),
            },
            TestCase {
                input: String::from(
                    "---\nTitle: Punct\nDate: 2017-01-01\nCategory: Misc\nTags: [rust, \"!!\"]\n---\n",
                ),
                check: &|e: &Error| matches!(e, Error::EmptySlug("Tags")),
            },
        ] {
            match parser.parse_source("p", &tc.input) {
                Ok(_) => panic!("wanted error for {:?}", tc.input),
                Err(e) => assert!((tc.check)(&e), "unexpected error {:?} for {:?}", e, tc.input),
            }
        }
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let (site_root, output_directory) = parser_fixture();
        let parser = Parser::new(&site_root, &output_directory, "Site Author");
        let posts = parser.parse_posts(Path::new("./testdata/project/posts/"))?;

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            vec!["markdown-tour", "archive/first-light", "hello-world"],
            ids
        );
        assert_eq!("https://example.com/post/archive/first-light/", posts[1].url.as_str());
        Ok(())
    }

    #[test]
    fn test_post_id() {
        assert_eq!("a/b", post_id(Path::new("a/b.md")).unwrap());
        assert_eq!("hello", post_id(Path::new("hello.md")).unwrap());
    }
}
