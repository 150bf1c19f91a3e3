//! # Server API
//!
//! The HTTP layer: the authenticated [`client::ApiClient`], the response
//! envelope, and the typed payload records pages deserialize from it.

pub mod client;
pub mod types;
