//! Defines the [`Category`] type. Every [`crate::post::Post`] is filed under
//! exactly one category.

use crate::route::Route;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use url::{ParseError, Url};

/// A post category. Like [`crate::tag::Tag`], categories are identified by
/// their slug.
#[derive(Clone, Debug)]
pub struct Category {
    pub name: String,
    pub slug: String,

    /// The URL for the category's first index page, i.e.
    /// `{site_root}category/{slug}/`.
    pub url: Url,
}

impl Category {
    /// Creates a [`Category`] from its `name`, deriving the slug and the URL.
    pub fn new(name: &str, site_root: &Url) -> Result<Category, ParseError> {
        let slug = slug::slugify(name);
        Ok(Category {
            name: name.trim().to_owned(),
            url: Route::Category(slug.clone()).url(site_root)?,
            slug,
        })
    }

    /// The route of the category's index.
    pub fn route(&self) -> Route {
        Route::Category(self.slug.clone())
    }
}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Category {}

impl From<&Category> for Value {
    /// Converts [`Category`]s into [`Value`]s for templating.
    fn from(c: &Category) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(c.name.clone()));
        m.insert("slug".to_owned(), Value::String(c.slug.clone()));
        m.insert("url".to_owned(), Value::String(c.url.to_string()));
        Value::Object(m)
    }
}
