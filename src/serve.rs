//! Preview server bridge.
//!
//! Runs `hugo server` as a child process next to the compile loop:
//!
//! 1. One local build cycle, so the tree is consistent before serving.
//! 2. Spawn `hugo server --bind <host> -p <port> ...`.
//! 3. Recompile changed documents until Ctrl+C or the server exits; hugo
//!    picks up the compiled files and re-renders on its own.
//! 4. Terminate and reap the server.

use crate::config::{Options, SiteConfig};
use crate::core::GuardedScope;
use crate::generator::GeneratorArgs;
use crate::logger::status_detach;
use crate::orchestrator::{BuildError, ChangeWatcher, Orchestrator};
use crate::{debug, log};
use std::process::Child;
use std::thread;
use std::time::Duration;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Serve the site until cancelled or the server process exits.
///
/// `theme` overrides the theme for this run only.
pub fn serve(
    options: &Options,
    orchestrator: &Orchestrator<'_>,
    theme: Option<String>,
) -> Result<(), BuildError> {
    let _scope = GuardedScope::enter();
    let cancel = orchestrator.cancel_token();

    orchestrator.build(true, false)?;

    let site = SiteConfig::load(&options.root)?;
    let args = GeneratorArgs::for_server(&site, options, theme);
    let mut child = ServerChild(orchestrator.generator().spawn(&args, &options.root)?);
    status_detach();
    log!(
        "serve";
        "http://{}:{}{}",
        options.serve.host,
        options.serve.port,
        site.site_base_dir()
    );

    if options.serve.watch {
        let mut watcher = ChangeWatcher::new(&site)?;
        while let Some(batch) = watcher.next_batch(cancel, || child.is_running())? {
            debug!("serve"; "{} changed paths", batch.len());
            if !orchestrator.report_cycle(orchestrator.compile_only(false)) {
                break;
            }
            watcher.reload(&options.root);
        }
    } else {
        while !cancel.is_cancelled() && child.is_running() {
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }

    if !child.is_running() {
        log!("serve"; "hugo server exited");
    }
    Ok(())
}

/// Server process, killed and reaped on drop.
struct ServerChild(Child);

impl ServerChild {
    fn is_running(&mut self) -> bool {
        matches!(self.0.try_wait(), Ok(None))
    }
}

impl Drop for ServerChild {
    fn drop(&mut self) {
        if self.is_running()
            && let Err(e) = self.0.kill()
        {
            log!("warn"; "failed to stop hugo server: {}", e);
        }
        // Reap so no zombie is left behind.
        let _ = self.0.wait();
    }
}
