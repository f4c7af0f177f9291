//! Service layer for the blog: article persistence and the admin access gate.
//! - `article` holds the domain types, the flat-file codec and the renderer.
//! - `file` holds the directory-backed store.
//! - `auth` decides whether a request may mutate articles.

pub mod errors;
pub mod article;
pub mod file;
pub mod auth;
pub mod runtime;
