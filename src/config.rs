//! Loads the project configuration. A project is a directory containing an
//! [`PROJECT_FILE`], a `posts` directory of markdown sources, and a `theme`
//! directory holding `theme.yaml`, the templates it references, and a
//! `static` directory of assets.

use crate::sidebar::DEFAULT_RECENT_POSTS;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "ogham.yaml";

/// The default output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "_site";

/// The site author, credited on posts without an explicit `Author` and in
/// the feed.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct RecentPosts(usize);
impl Default for RecentPosts {
    fn default() -> Self {
        RecentPosts(DEFAULT_RECENT_POSTS)
    }
}

#[derive(Deserialize)]
struct Project {
    title: String,

    #[serde(default)]
    footer: Option<String>,

    site_root: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default)]
    index_page_size: PageSize,

    #[serde(default)]
    recent_posts: RecentPosts,
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
}

/// The resolved configuration for building a site.
#[derive(Clone, Debug)]
pub struct Config {
    /// The site's title, shown in the header of every page.
    pub title: String,

    /// The text shown in the footer of every page.
    pub footer: String,

    pub author: Option<Author>,

    /// The base URL of the site. Always ends in a trailing slash.
    pub site_root: Url,

    /// The URL of the first home page. Same as `site_root`.
    pub home_page: Url,

    /// The URL of the theme's static assets.
    pub static_url: Url,

    /// The URL of the Atom feed.
    pub atom_url: Url,

    pub posts_source_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub root_output_directory: PathBuf,
    pub static_output_directory: PathBuf,

    /// The template files for index pages, concatenated in order.
    pub index_template: Vec<PathBuf>,

    /// The template files for post pages, concatenated in order.
    pub posts_template: Vec<PathBuf>,

    /// The number of posts per index page. Always at least 1.
    pub index_page_size: usize,

    /// The number of posts listed in the sidebar's recent posts widget.
    pub recent_posts: usize,
}

impl Config {
    /// Searches `dir` and its ancestors for a [`PROJECT_FILE`] and loads the
    /// first one found. See [`Config::from_project_file`].
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.exists() {
                return Config::from_project_file(&path, output_directory);
            }
            current = dir.parent();
        }
        Err(Error::ProjectFileNotFound(dir.to_owned()))
    }

    /// Loads the project file at `path` along with the theme it uses. If
    /// `output_directory` is `None`, the site is rendered into
    /// [`DEFAULT_OUTPUT_DIRECTORY`] within the project root.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        debug!(path = %path.display(), "loading project file");
        let project: Project = serde_yaml::from_reader(open(path)?)
            .map_err(|err| Error::Yaml {
                path: path.to_owned(),
                err,
            })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(path.to_owned()))?;

        let theme_dir = project_root.join("theme");
        let theme_path = theme_dir.join("theme.yaml");
        let theme: Theme = serde_yaml::from_reader(open(&theme_path)?)
            .map_err(|err| Error::Yaml {
                path: theme_path.clone(),
                err,
            })?;

        if project.index_page_size.0 < 1 {
            return Err(Error::InvalidPageSize);
        }

        let site_root = with_trailing_slash(project.site_root);
        let root_output_directory = match output_directory {
            Some(dir) => dir.to_owned(),
            None => project_root.join(DEFAULT_OUTPUT_DIRECTORY),
        };

        Ok(Config {
            footer: match project.footer {
                Some(footer) => footer,
                None => project.title.clone(),
            },
            title: project.title,
            author: project.author,
            home_page: site_root.clone(),
            static_url: site_root.join("static/")?,
            atom_url: site_root.join("feed.atom")?,
            posts_source_directory: project_root.join("posts"),
            static_source_directory: theme_dir.join("static"),
            static_output_directory: root_output_directory.join("static"),
            root_output_directory,
            index_template: theme
                .index_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            posts_template: theme
                .posts_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            index_page_size: project.index_page_size.0,
            recent_posts: project.recent_posts.0,
            site_root,
        })
    }
}

// URL joining treats the last path segment as a file unless the base ends in
// a slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no project file exists in the directory or any of its
    /// ancestors.
    ProjectFileNotFound(PathBuf),

    /// Returned when the project file path has no parent directory.
    NoParentDirectory(PathBuf),

    /// Returned when a configuration file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when a configuration file isn't valid.
    Yaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when `index_page_size` is zero.
    InvalidPageSize,

    /// Returned when a derived URL can't be built from `site_root`.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound(dir) => write!(
                f,
                "Could not find `{}` in `{}` or any parent directory",
                PROJECT_FILE,
                dir.display()
            ),
            Error::NoParentDirectory(path) => write!(
                f,
                "Can't get parent directory for project file '{}'",
                path.display()
            ),
            Error::Open { path, err } => {
                write!(f, "Opening '{}': {}", path.display(), err)
            }
            Error::Yaml { path, err } => {
                write!(f, "Loading '{}': {}", path.display(), err)
            }
            Error::InvalidPageSize => {
                write!(f, "`index_page_size` must be at least 1")
            }
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound(_) => None,
            Error::NoParentDirectory(_) => None,
            Error::Open { path: _, err } => Some(err),
            Error::Yaml { path: _, err } => Some(err),
            Error::InvalidPageSize => None,
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
