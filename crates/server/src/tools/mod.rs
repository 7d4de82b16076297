//! MCP tool implementations.
//!
//! This module contains all tools exposed by the swcache-mcp server.

pub mod cache;
pub mod intercept;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

pub use intercept::{InterceptOutput, InterceptParams};
