//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), rendering index and post pages ([`crate::write`]),
//! copying the theme's static directory into the output directory, and
//! generating the Atom feed.

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::{Error as ParseError, Parser};
use crate::route::GENERATED_DIRECTORIES;
use crate::sidebar::sidebar;
use crate::write::{Error as WriteError, Writer};
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The name of the Atom feed file within the output directory.
pub const FEED_FILE: &str = "feed.atom";

/// A summary of a successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub pages: usize,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`Parser::parse_posts`], [`Writer::write_posts`], and
/// [`crate::feed::write_feed`] which do the heavy-lifting. This function also
/// copies the static assets from source directory to the output directory.
pub fn build_site(config: Config) -> Result<Summary> {
    let default_author = config
        .author
        .as_ref()
        .map(|author| author.name.as_str())
        .unwrap_or("");
    let parser = Parser::new(
        &config.site_root,
        &config.root_output_directory,
        default_author,
    );

    // collect all posts
    let posts = parser.parse_posts(&config.posts_source_directory)?;
    info!(posts = posts.len(), "parsed posts");

    // Parse the template files.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;

    // Only the directories the build owns are removed; the output root may
    // hold files the build doesn't know about.
    for dir in GENERATED_DIRECTORIES {
        rmdir(&config.root_output_directory.join(dir))?;
    }
    rmdir(&config.static_output_directory)?;

    let globals = globals(&config, &posts)?;
    let writer = Writer {
        posts_template: &posts_template,
        index_template: &index_template,
        site_root: &config.site_root,
        output_directory: &config.root_output_directory,
        index_page_size: config.index_page_size,
        globals: &globals,
    };
    let pages = writer.write_posts(&posts)?;

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }

    // create the atom feed
    let feed_path = config.root_output_directory.join(FEED_FILE);
    write_feed(
        FeedConfig {
            title: config.title,
            id: config.home_page.to_string(),
            author: config.author,
            home_page: config.home_page,
        },
        &posts,
        File::create(&feed_path)?,
    )?;
    info!(path = %feed_path.display(), "wrote feed");

    Ok(Summary {
        posts: posts.len(),
        pages,
    })
}

// Values shared by every page.
fn globals(config: &Config, posts: &[crate::post::Post]) -> Result<HashMap<String, Value>> {
    let mut globals: HashMap<String, Value> = HashMap::new();
    globals.insert("site_title".to_owned(), Value::String(config.title.clone()));
    globals.insert("site_footer".to_owned(), Value::String(config.footer.clone()));
    globals.insert(
        "home_page".to_owned(),
        Value::String(config.home_page.to_string()),
    );
    globals.insert(
        "static_url".to_owned(),
        Value::String(config.static_url.to_string()),
    );
    globals.insert(
        "feed_url".to_owned(),
        Value::String(config.atom_url.to_string()),
    );
    globals.insert(
        "sidebar".to_owned(),
        sidebar(posts, config.recent_posts, &config.site_root)?,
    );
    Ok(globals)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let (from, to) = (entry.path(), dst.join(entry.file_name()));
        if entry.file_type()?.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            debug!(path = %to.display(), "copying static file");
            std::fs::copy(&from, &to)?;
        }
    }

    Ok(())
}

// Loads the template files' contents in order and parses the concatenation
// into a single template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of building a site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing [`crate::post::Post`]s to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned when a sidebar URL can't be built.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Feed(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
