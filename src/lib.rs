//! Quill library exports for the binary and integration tests.

pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

pub use crate::core::error::{Error, Result};
pub use crate::core::notebook::Notebook;
