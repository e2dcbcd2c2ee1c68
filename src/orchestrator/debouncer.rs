//! Coalescing of raw filesystem events into rebuild batches.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use crate::debug;
use crate::utils::path::normalize_path;

/// Quiet period after the last event before a batch is released.
const QUIET: Duration = Duration::from_millis(300);
/// Minimum gap between two batches.
const COOLDOWN: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }

    fn from_event(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    /// What a pending change becomes when `next` arrives for the same path.
    /// `None` means the two cancel out.
    fn merge(self, next: Self) -> Option<Self> {
        match (self, next) {
            (Self::Created, Self::Removed) => None,
            (Self::Removed, Self::Created | Self::Modified) => Some(next),
            (_, Self::Removed) => Some(Self::Removed),
            (pending, _) => Some(pending),
        }
    }
}

pub(super) struct Debouncer {
    pending: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
    last_batch: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            pending: FxHashMap::default(),
            last_event: None,
            last_batch: None,
        }
    }

    /// Queue the paths of `event` accepted by `keep`, skipping editor
    /// scratch files and metadata-only changes.
    pub(super) fn add_event(&mut self, event: &notify::Event, keep: impl Fn(&Path) -> bool) {
        let Some(kind) = ChangeKind::from_event(event.kind) else {
            return;
        };
        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            let path = normalize_path(path);
            if keep(&path) {
                self.add(path, kind);
            }
        }
    }

    pub(super) fn add(&mut self, path: PathBuf, kind: ChangeKind) {
        self.last_event = Some(Instant::now());
        let merged = match self.pending.get(&path) {
            Some(&pending) => pending.merge(kind),
            None => Some(kind),
        };
        match merged {
            Some(kind) => {
                debug!("watch"; "{}: {}", kind.label(), path.display());
                self.pending.insert(path, kind);
            }
            None => {
                debug!("watch"; "created then removed: {}", path.display());
                self.pending.remove(&path);
            }
        }
    }

    /// The sorted batch, once the quiet period and the cooldown are over.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        if self.pending.is_empty() || !self.wait().is_zero() || self.last_event.is_none() {
            return None;
        }
        self.last_event = None;
        self.last_batch = Some(Instant::now());
        let mut batch: Vec<_> = self.pending.drain().collect();
        batch.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Some(batch)
    }

    /// How long to block on the event channel: until the pending batch may
    /// be ready, never less than 1ms or more than `max`.
    pub(super) fn sleep_duration(&self, max: Duration) -> Duration {
        if self.last_event.is_none() {
            return max;
        }
        self.wait().clamp(Duration::from_millis(1), max)
    }

    fn wait(&self) -> Duration {
        let remaining = |since: Option<Instant>, span: Duration| {
            since.map_or(Duration::ZERO, |t| span.saturating_sub(t.elapsed()))
        };
        remaining(self.last_event, QUIET).max(remaining(self.last_batch, COOLDOWN))
    }
}

/// Editor swap, backup and lock files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(['.', '#'])
}
