//! Core process state shared across the codebase.

mod state;

pub use state::{CancelToken, GuardedScope, setup_shutdown_handler, shutdown_token};
