//! Process-wide cancellation state.
//!
//! Two pieces:
//! - `CancelToken`: a cloneable flag checked between build cycles and at
//!   process spawn time.
//! - `GUARDED`: whether a build cycle is running. While it is, Ctrl+C only
//!   cancels (so invocation guards get to clean up); otherwise the
//!   process exits immediately.

use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Cancellation is sticky.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Token cancelled by Ctrl+C.
static SHUTDOWN: LazyLock<CancelToken> = LazyLock::new(CancelToken::new);

/// Number of active guarded scopes.
static GUARDED: AtomicUsize = AtomicUsize::new(0);

/// The process-wide shutdown token.
pub fn shutdown_token() -> CancelToken {
    SHUTDOWN.clone()
}

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - Outside a guarded scope: exit immediately.
/// - Inside one: cancel the shutdown token and let the cycle unwind.
/// - A second Ctrl+C always exits.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        let already = SHUTDOWN.is_cancelled();
        SHUTDOWN.cancel();

        if already || GUARDED.load(Ordering::SeqCst) == 0 {
            std::process::exit(130);
        }
        crate::log!("watch"; "stopping after the current cycle (Ctrl+C again to force)");
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// RAII marker for work that must be allowed to clean up on Ctrl+C.
pub struct GuardedScope(());

impl GuardedScope {
    pub fn enter() -> Self {
        GUARDED.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Drop for GuardedScope {
    fn drop(&mut self) {
        GUARDED.fetch_sub(1, Ordering::SeqCst);
    }
}
