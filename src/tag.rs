//! Defines the [`Tag`] type, which represents a [`crate::post::Post`] tag.

use crate::route::Route;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use url::{ParseError, Url};

/// Represents a [`crate::post::Post`] tag. A post may carry any number of
/// tags, and every tag gets its own paginated index.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag's name as written in the post's frontmatter.
    pub name: String,

    /// The slugified name, so e.g., `macOS` and `MacOS` resolve to the same
    /// tag. Used as the tag's identity and as its URL path segment.
    pub slug: String,

    /// The URL for the tag's first index page, i.e. `{site_root}tag/{slug}/`.
    pub url: Url,
}

impl Tag {
    /// Creates a [`Tag`] from its `name`, deriving the slug and the URL.
    pub fn new(name: &str, site_root: &Url) -> Result<Tag, ParseError> {
        let slug = slug::slugify(name);
        Ok(Tag {
            name: name.trim().to_owned(),
            url: Route::Tag(slug.clone()).url(site_root)?,
            slug,
        })
    }

    /// The route of the tag's index.
    pub fn route(&self) -> Route {
        Route::Tag(self.slug.clone())
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `slug`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(t.name.clone()));
        m.insert("slug".to_owned(), Value::String(t.slug.clone()));
        m.insert("url".to_owned(), Value::String(t.url.to_string()));
        Value::Object(m)
    }
}
