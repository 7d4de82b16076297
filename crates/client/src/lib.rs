//! Client code for swcache.
//!
//! This crate provides the live network side of the engine: a reqwest-backed
//! [`swcache_core::Fetcher`] and request URL resolution for hosts.

pub mod fetch;

pub use fetch::{FetchConfig, NetworkFetcher, UrlError, resolve};
