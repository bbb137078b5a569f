//! Response caching layer
//!
//! Memoizes upstream JSON payloads for a short TTL using Moka.
//! Keeps repeat dashboard requests off the rate-limited weather API.

pub mod store;

pub use store::{CacheStats, ResponseCache};
