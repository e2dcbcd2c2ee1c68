//! Terminal output.
//!
//! - `log!` / `debug!`: one line with a colored `[tag]` prefix
//! - `status_*`: the rebuild status block that watch mode keeps redrawing
//! - [`ProgressLine`]: per-kind compile counters on a single line
//!
//! ```ignore
//! log!("build"; "compiling {} documents", count);
//! debug!("hugo"; "{}", command_line);
//! ```

use crate::utils::date::DateTimeUtc;
use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::io::{StdoutLock, Write, stdout};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Whether a [`ProgressLine`] currently owns the cursor line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Height of the last status block, so the next one can overwrite it.
static STATUS_HEIGHT: Mutex<usize> = Mutex::new(0);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

#[macro_export]
macro_rules! log {
    ($tag:expr; $($arg:tt)*) => {{
        $crate::logger::log($tag, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($tag:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($tag, &format!($($arg)*))
        }
    }};
}

pub fn log(tag: &str, message: &str) {
    let mut out = stdout().lock();
    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }
    writeln!(out, "{} {message}", prefix(tag)).ok();
    out.flush().ok();
}

fn prefix(tag: &str) -> String {
    let label = format!("[{tag}]");
    match tag.to_ascii_lowercase().as_str() {
        "error" => label.bright_red().bold().to_string(),
        "warn" => label.bright_magenta().bold().to_string(),
        "hugo" => label.bright_cyan().bold().to_string(),
        "serve" => label.bright_blue().bold().to_string(),
        "watch" => label.bright_green().bold().to_string(),
        _ => label.bright_yellow().bold().to_string(),
    }
}

// Rebuild status

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Rebuilt,
    Unchanged,
    Failed,
}

/// One status block: `[hh:mm:ss] <mark> <text>`, with multi-line text
/// kept below the first line.
fn status_block(outcome: Outcome, time: &str, text: &str) -> String {
    let time = format!("[{time}]").dimmed().to_string();
    match outcome {
        Outcome::Rebuilt => format!("{time} {} {text}", "✓".green()),
        Outcome::Unchanged => format!("{time} {}", text.dimmed()),
        Outcome::Failed => format!("{time} {} {text}", "✗".red()),
    }
}

fn show_status(outcome: Outcome, text: &str) {
    let mut height = STATUS_HEIGHT.lock();
    let mut out = stdout().lock();
    if let Ok(lines) = u16::try_from(*height)
        && lines > 0
    {
        queue!(out, cursor::MoveUp(lines), Clear(ClearType::FromCursorDown)).ok();
    }
    let block = status_block(outcome, &DateTimeUtc::now().to_hms(), text);
    writeln!(out, "{block}").ok();
    out.flush().ok();
    *height = block.lines().count().max(1);
}

pub fn status_success(text: &str) {
    show_status(Outcome::Rebuilt, text);
}

pub fn status_unchanged(text: &str) {
    show_status(Outcome::Unchanged, text);
}

pub fn status_error(summary: &str, detail: &str) {
    if detail.is_empty() {
        show_status(Outcome::Failed, summary);
    } else {
        show_status(Outcome::Failed, &format!("{summary}\n{detail}"));
    }
}

/// Start the next status on a fresh line: something else (the preview
/// server, a plain log) has written below the current block.
pub fn status_detach() {
    *STATUS_HEIGHT.lock() = 0;
}

// Compile progress

/// `[compile] html(2/3) markdown(1/1)`, redrawn in place.
///
/// Kinds with nothing to do are left out.
pub struct ProgressLine {
    kinds: Vec<(&'static str, usize, AtomicUsize)>,
}

impl ProgressLine {
    pub fn new(totals: &[(&'static str, usize)]) -> Self {
        let kinds = totals
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(kind, total)| (kind, total, AtomicUsize::new(0)))
            .collect();
        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        let line = Self { kinds };
        line.draw(false);
        line
    }

    pub fn inc(&self, kind: &str) {
        if let Some((_, _, done)) = self.kinds.iter().find(|(k, _, _)| *k == kind) {
            done.fetch_add(1, Ordering::Relaxed);
            self.draw(false);
        }
    }

    /// Leave the final counts on screen.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        self.draw(true);
        std::mem::forget(self);
    }

    fn counts(&self) -> String {
        self.kinds
            .iter()
            .map(|(kind, total, done)| format!("{kind}({}/{total})", done.load(Ordering::Relaxed)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn draw(&self, done: bool) {
        let mut out = stdout().lock();
        rewind(&mut out);
        let line = format!("{} {}", prefix("compile"), self.counts());
        if done {
            writeln!(out, "{line}").ok();
        } else {
            write!(out, "{line}").ok();
        }
        out.flush().ok();
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        let mut out = stdout().lock();
        rewind(&mut out);
        out.flush().ok();
    }
}

fn rewind(out: &mut StdoutLock<'_>) {
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}
