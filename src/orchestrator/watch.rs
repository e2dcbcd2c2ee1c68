//! File watching for the rebuild loop.
//!
//! notify delivers events on its own thread; they are forwarded through an
//! `mpsc` channel and consumed on the main thread, which is the only one
//! running build cycles.

use super::BuildError;
use super::debouncer::{ChangeKind, Debouncer};
use crate::compiler::is_derived_artifact;
use crate::config::{SITE_CONFIG_CANDIDATES, SiteConfig};
use crate::core::CancelToken;
use crate::debug;
use crate::freshness::STATE_DIR;
use crate::utils::path::normalize_path;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

/// Upper bound on one wait, so cancellation and liveness are polled.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Site directories watched besides the content and themes dirs.
const SITE_DIRS: &[&str] = &["layouts", "static", "data", "assets", "archetypes", "i18n"];

fn site_dirs<'a>(site: &'a SiteConfig, root: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
    [site.content_dir(), site.themes_dir()]
        .into_iter()
        .chain(SITE_DIRS.iter().copied())
        .map(move |dir| root.join(dir))
}

/// The site root (watched on its own, for the config file and new site
/// directories) plus every existing site directory.
///
/// Watching the root rather than the config file keeps the watch alive
/// across editors that save by renaming a new file over the old one.
pub fn watch_roots(site: &SiteConfig) -> Vec<PathBuf> {
    let mut roots = vec![site.root().to_path_buf()];
    for path in site_dirs(site, site.root()) {
        if path.is_dir() && !roots.contains(&path) {
            roots.push(path);
        }
    }
    roots
}

/// Paths whose changes never start a cycle: compiled output, the generator's
/// output and side-effect dirs, the tool's own state, and anything directly
/// under the root that is neither a config file nor a site directory.
struct PathFilter {
    root: PathBuf,
    top_dirs: Vec<PathBuf>,
    ignored_dirs: Vec<PathBuf>,
}

impl PathFilter {
    fn new(site: &SiteConfig) -> Self {
        let root = normalize_path(site.root());
        Self {
            top_dirs: site_dirs(site, &root).collect(),
            ignored_dirs: vec![
                root.join(site.publish_dir()),
                root.join("resources"),
                root.join(STATE_DIR),
            ],
            root,
        }
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if path.parent() == Some(self.root.as_path()) {
            let is_config = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| SITE_CONFIG_CANDIDATES.contains(&name));
            return is_config || self.top_dirs.iter().any(|dir| dir == path);
        }
        !self.ignored_dirs.iter().any(|dir| path.starts_with(dir))
            && !is_derived_artifact(path)
    }
}

pub struct ChangeWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    debouncer: Debouncer,
    filter: PathFilter,
    roots: Vec<PathBuf>,
}

impl ChangeWatcher {
    pub fn new(site: &SiteConfig) -> Result<Self, BuildError> {
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver is gone once the loop has ended.
            let _ = tx.send(res);
        })
        .map_err(|source| BuildError::Watch {
            path: site.root().to_path_buf(),
            source,
        })?;

        let roots = watch_roots(site);
        for root in &roots {
            watch_path(&mut watcher, root, site.root())?;
        }

        Ok(Self {
            watcher,
            rx,
            debouncer: Debouncer::new(),
            filter: PathFilter::new(site),
            roots,
        })
    }

    /// Follow a reloaded site config: new directories are watched, vanished
    /// or renamed ones dropped, and the filter rebuilt.
    ///
    /// Returns whether the set of watched paths changed.
    pub fn refresh(&mut self, site: &SiteConfig) -> Result<bool, BuildError> {
        self.filter = PathFilter::new(site);
        let roots = watch_roots(site);
        if roots == self.roots {
            return Ok(false);
        }

        for old in self.roots.iter().filter(|old| !roots.contains(old)) {
            if let Err(e) = self.watcher.unwatch(old) {
                debug!("watch"; "unwatch {}: {}", old.display(), e);
            }
        }
        for new in roots.iter().filter(|new| !self.roots.contains(new)) {
            watch_path(&mut self.watcher, new, site.root())?;
        }
        self.roots = roots;
        Ok(true)
    }

    /// Reload the site config under `root` and refresh from it. A config
    /// that fails to load keeps the current watch; the build reports it.
    pub fn reload(&mut self, root: &Path) {
        let site = match SiteConfig::load(root) {
            Ok(site) => site,
            Err(e) => {
                debug!("watch"; "keeping watch roots: {}", e);
                return;
            }
        };
        match self.refresh(&site) {
            Ok(true) => debug!("watch"; "now watching {} paths", self.roots.len()),
            Ok(false) => {}
            Err(e) => crate::log!("warn"; "{}", e),
        }
    }

    /// Block until a debounced batch of changes is ready.
    ///
    /// Returns `None` once `cancel` is set or `alive` reports false.
    pub fn next_batch(
        &mut self,
        cancel: &CancelToken,
        mut alive: impl FnMut() -> bool,
    ) -> Result<Option<Vec<(PathBuf, ChangeKind)>>, BuildError> {
        loop {
            if cancel.is_cancelled() || !alive() {
                return Ok(None);
            }

            match self.rx.recv_timeout(self.debouncer.sleep_duration(POLL_INTERVAL)) {
                Ok(Ok(event)) => {
                    let filter = &self.filter;
                    self.debouncer.add_event(&event, |p| filter.is_relevant(p));
                }
                Ok(Err(e)) => crate::log!("warn"; "watch error: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(BuildError::WatcherGone),
            }

            if let Some(batch) = self.debouncer.take_if_ready() {
                return Ok(Some(batch));
            }
        }
    }
}

fn watch_path(
    watcher: &mut RecommendedWatcher,
    path: &Path,
    site_root: &Path,
) -> Result<(), BuildError> {
    let mode = if path == site_root {
        RecursiveMode::NonRecursive
    } else {
        RecursiveMode::Recursive
    };
    watcher.watch(path, mode).map_err(|source| BuildError::Watch {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn site_with(root: &Path, config: &str) -> SiteConfig {
        fs::write(root.join("hugo.toml"), config).unwrap();
        SiteConfig::parse(root, &root.join("hugo.toml"), Dialect::Toml, config).unwrap()
    }

    fn site(root: &Path) -> SiteConfig {
        site_with(root, "publishDir = \"docs\"\n")
    }

    fn batch(watcher: &mut ChangeWatcher) -> Vec<(PathBuf, ChangeKind)> {
        let deadline = Instant::now() + Duration::from_secs(10);
        watcher
            .next_batch(&CancelToken::new(), || Instant::now() < deadline)
            .unwrap()
            .expect("no changes seen")
    }

    fn contains(batch: &[(PathBuf, ChangeKind)], path: &Path) -> bool {
        batch.iter().any(|(p, _)| p == path)
    }

    #[test]
    fn test_watch_roots_existing_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        let roots = watch_roots(&site(dir.path()));
        assert_eq!(
            roots,
            [
                dir.path().to_path_buf(),
                dir.path().join("content"),
                dir.path().join("layouts"),
            ]
        );
    }

    #[test]
    fn test_filter() {
        let dir = TempDir::new().unwrap();
        let site = site(dir.path());
        let root = normalize_path(dir.path());
        fs::create_dir_all(root.join("content")).unwrap();
        fs::write(root.join("content/a.Rmd"), "").unwrap();
        let filter = PathFilter::new(&site);

        assert!(filter.is_relevant(&root.join("content/a.Rmd")));
        assert!(filter.is_relevant(&root.join("content/b.html")));
        assert!(!filter.is_relevant(&root.join("content/a.html")));
        assert!(!filter.is_relevant(&root.join("docs/index.html")));
        assert!(!filter.is_relevant(&root.join(".pressroom/fingerprints.json")));
        assert!(!filter.is_relevant(&root.join("resources/_gen/x")));

        assert!(filter.is_relevant(&root.join("hugo.toml")));
        assert!(filter.is_relevant(&root.join("config.yaml")));
        assert!(filter.is_relevant(&root.join("layouts")));
        assert!(!filter.is_relevant(&root.join("notes.txt")));
        assert!(!filter.is_relevant(&root.join("docs")));
    }

    #[test]
    fn test_next_batch_stops_on_cancel_and_liveness() {
        let dir = TempDir::new().unwrap();
        let site = site(dir.path());
        let mut watcher = ChangeWatcher::new(&site).unwrap();

        let cancel = CancelToken::new();
        assert!(watcher.next_batch(&cancel, || false).unwrap().is_none());

        cancel.cancel();
        assert!(watcher.next_batch(&cancel, || true).unwrap().is_none());
    }

    #[test]
    fn test_config_saved_by_rename_is_seen_every_time() {
        let dir = TempDir::new().unwrap();
        let site = site(dir.path());
        let mut watcher = ChangeWatcher::new(&site).unwrap();
        let config = normalize_path(dir.path()).join("hugo.toml");

        for title in ["first", "second"] {
            let tmp = dir.path().join("hugo.toml.tmp");
            fs::write(&tmp, format!("title = \"{title}\"\n")).unwrap();
            fs::rename(&tmp, dir.path().join("hugo.toml")).unwrap();

            let seen = batch(&mut watcher);
            assert!(contains(&seen, &config), "{title}: {seen:?}");
        }
    }

    #[test]
    fn test_refresh_follows_new_site_dirs() {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        fs::create_dir_all(root.join("content")).unwrap();
        let site = site(dir.path());
        let mut watcher = ChangeWatcher::new(&site).unwrap();
        assert!(!watcher.refresh(&site).unwrap());

        // A new site directory starts a cycle, then gets watched.
        fs::create_dir(root.join("layouts")).unwrap();
        assert!(contains(&batch(&mut watcher), &root.join("layouts")));
        watcher.reload(dir.path());
        assert!(watcher.roots.contains(&dir.path().join("layouts")));
        fs::write(root.join("layouts/single.html"), "{{ .Content }}").unwrap();
        assert!(contains(&batch(&mut watcher), &root.join("layouts/single.html")));

        // So does a content dir moved by a config edit.
        fs::create_dir(root.join("notes")).unwrap();
        let moved = site_with(dir.path(), "publishDir = \"docs\"\ncontentDir = \"notes\"\n");
        assert!(watcher.refresh(&moved).unwrap());
        assert!(!watcher.roots.contains(&dir.path().join("content")));
        fs::write(root.join("notes/a.Rmd"), "# A\n").unwrap();
        assert!(contains(&batch(&mut watcher), &root.join("notes/a.Rmd")));
    }
}
