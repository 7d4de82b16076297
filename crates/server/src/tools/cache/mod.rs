//! Cache inspection tools.

pub mod list;
