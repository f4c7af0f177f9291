//! Article domain: the record type, the flat-file codec, Markdown rendering
//! and the repository abstraction the HTTP layer talks to.

pub mod domain;
pub mod codec;
pub mod render;
pub mod repository;

pub use domain::{Article, ArticleInput};
pub use repository::ArticleRepository;
