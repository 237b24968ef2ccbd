//! Support for creating Atom feeds from a list of posts.

use crate::config::Author;
use crate::post::Post;
use atom_syndication::{Category, Entry, Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`]. This function
/// takes ownership of the provided [`FeedConfig`].
pub fn write_feed<W: Write>(config: FeedConfig, posts: &[Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn utc() -> Result<FixedOffset> {
    FixedOffset::east_opt(0).ok_or(Error::Offset)
}

fn to_fixed(date: &NaiveDateTime) -> Result<DateTime<FixedOffset>> {
    Ok(utc()?.from_utc_datetime(date))
}

fn feed(config: FeedConfig, posts: &[Post]) -> Result<Feed> {
    let mut feed = Feed::default();
    feed.entries = feed_entries(&config, posts)?;
    feed.title = config.title.into();
    feed.id = config.id;
    // the newest modification, or now if there are no posts
    feed.updated = match posts.iter().map(|p| p.modified).max() {
        Some(modified) => to_fixed(&modified)?,
        None => Utc::now().with_timezone(&utc()?),
    };
    feed.authors = author_to_people(config.author.as_ref(), None);
    feed.links = vec![link(&config.home_page)];
    Ok(feed)
}

fn feed_entries(config: &FeedConfig, posts: &[Post]) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        let mut entry = Entry::default();
        entry.id = post.url.to_string();
        entry.title = post.title.clone().into();
        entry.updated = to_fixed(&post.modified)?;
        entry.published = Some(to_fixed(&post.created)?);
        entry.authors = author_to_people(config.author.as_ref(), Some(post.author.as_str()));
        entry.links = vec![link(&post.url)];
        entry.summary = Some(post.excerpt.clone().into());
        entry.categories = std::iter::once((&post.category.slug, &post.category.name))
            .chain(post.tags.iter().map(|t| (&t.slug, &t.name)))
            .map(|(term, label)| {
                let mut category = Category::default();
                category.term = term.clone();
                category.label = Some(label.clone());
                category
            })
            .collect();
        entries.push(entry);
    }
    Ok(entries)
}

fn link(url: &Url) -> Link {
    let mut link = Link::default();
    link.href = url.to_string();
    link.rel = "alternate".to_owned();
    link
}

/// Returns the people credited for a post. A post's own author takes
/// precedence over the site author; the site author's email is only kept when
/// the names agree.
fn author_to_people(site_author: Option<&Author>, post_author: Option<&str>) -> Vec<Person> {
    let mut person = Person::default();
    match (site_author, post_author) {
        (_, Some(name)) if !name.is_empty() => {
            person.name = name.to_owned();
            person.email = site_author.filter(|a| a.name == name).and_then(|a| a.email.clone());
        }
        (Some(author), _) => {
            person.name = author.name.clone();
            person.email = author.email.clone();
        }
        _ => return Vec::new(),
    }
    vec![person]
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O and Atom
/// issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when the UTC offset can't be constructed.
    Offset,
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Offset => write!(f, "invalid UTC offset"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Offset => None,
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}
