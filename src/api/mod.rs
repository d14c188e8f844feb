//! Networking boundary: the HTTP client, its hooks, and the typed resource wrappers.

pub mod client;
pub mod error;
pub mod models;
pub mod multipart;
pub mod services;

pub use client::{ApiClient, UreqTransport};
pub use error::ApiError;
