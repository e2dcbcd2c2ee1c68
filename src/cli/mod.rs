//! Command-line interface module.
//!
//! - `args`: clap definitions
//! - `site`: `new-site`
//! - `content`: `new-content`, `new-post`
//! - `convert`: `convert`
//!
//! `build`, `watch` and `serve` go straight to the orchestrator.

mod args;
pub mod content;
pub mod convert;
pub mod site;

pub use args::{Cli, Commands};
