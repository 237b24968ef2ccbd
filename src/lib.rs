//! The library code for the `ogham` blog generator. A build is broken down
//! into three steps:
//!
//! 1. Parsing posts from markdown source files on disk ([`crate::parser`])
//! 2. Converting the posts into HTML pages on disk ([`crate::write`])
//! 3. Writing the Atom feed ([`crate::feed`])
//!
//! The second step is the more involved. Posts are grouped into indices: one
//! holding every post (the home page), one per archive month, one per
//! category and one per tag. Each index is paginated into pages of a
//! configurable number of posts, and each index page carries the window of
//! page links computed by [`crate::pagination::compute_window`]. Every page
//! also gets the sidebar widgets ([`crate::sidebar`]).
//!
//! Each page is then rendered by applying the theme's index or post template
//! and writing the result to its route's directory ([`crate::route`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod category;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod pagination;
pub mod parser;
pub mod post;
pub mod route;
pub mod sidebar;
pub mod tag;
pub mod write;
