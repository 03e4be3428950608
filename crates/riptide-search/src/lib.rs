//! Multi-provider torrent search.
//!
//! A [`SearchClient`] fans a query out to every registered provider
//! concurrently and races the whole batch against one shared deadline, so a
//! hung backend costs the configured timeout at most and never hides the
//! other providers' results.

mod client;
mod error;
mod provider;
pub mod providers;

pub use client::SearchClient;
pub use error::ProviderError;
pub use provider::{Provider, ProviderResult};
