//! Access gate: credential check, session tokens and the authorization predicate.
//!
//! The gate owns no per-session state. A session lives in a signed token held by
//! the client; each request resolves it into a `SessionContext`.

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::SessionContext;
pub use service::{is_authorized, AccessGate};
