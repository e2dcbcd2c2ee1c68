//! Utility modules shared by the pipeline and the CLI.

pub mod archive;
pub mod date;
pub mod exec;
pub mod fs;
pub mod path;
pub mod shortcode;
pub mod slug;
