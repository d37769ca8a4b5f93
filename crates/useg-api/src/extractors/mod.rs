//! Axum extractors for request handling
//!
//! Request bodies are JSON regardless of the declared content type, and
//! `GET` requests carry one too.

mod validated;

pub use validated::{JsonBody, ValidatedJson};
