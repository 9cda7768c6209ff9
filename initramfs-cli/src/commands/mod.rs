//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `build`: Write an initramfs archive
//! - `list`: List the planned archive content
//! - `completions`: Generate shell completion scripts

pub mod build;
pub mod completions;
pub mod list;

pub use build::BuildCommand;
pub use completions::CompletionsCommand;
pub use list::ListCommand;
