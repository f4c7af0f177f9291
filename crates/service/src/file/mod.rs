//! File-backed stores.

pub mod article_store;
