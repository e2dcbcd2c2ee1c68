//! Line-level editing of the site config file.
//!
//! Only top-level keys are touched: in TOML the assignments before the first
//! table header, in YAML the unindented mapping keys. Every other line is
//! kept byte-for-byte, so edits never reformat a hand-written config.
//!
//! Keys compare case-insensitively (Hugo does the same), so `baseURL` and
//! `baseurl` are one key.
//!
//! ```ignore
//! let mut file = ConfigFile::open(&root.join("hugo.toml"))?;
//! file.set_field("theme", Some(&quoted("hugo-lithium")))?;
//! file.set_field("draft", None)?;
//! file.commit()?;
//! ```

use super::dialect::Dialect;
use super::error::ConfigError;
use crate::utils::fs::{FsError, atomic_write};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A top-level assignment and the lines its value spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLine {
    pub key: String,
    /// First line (the `key = ...` line).
    pub start: usize,
    /// One past the last continuation line.
    pub end: usize,
}

fn toml_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*([A-Za-z0-9_-]+|"[^"]*"|'[^']*')\s*="#).expect("valid TOML key pattern")
    })
}

fn yaml_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^([A-Za-z0-9_][A-Za-z0-9_.-]*|"[^"]*"|'[^']*')\s*:(\s|$)"#)
            .expect("valid YAML key pattern")
    })
}

fn unquote(key: &str) -> &str {
    key.strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .or_else(|| key.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')))
        .unwrap_or(key)
}

/// Find every top-level assignment in `lines`.
pub fn scan_top_level<S: AsRef<str>>(lines: &[S], dialect: Dialect) -> Vec<KeyLine> {
    match dialect {
        Dialect::Toml => scan_toml(lines),
        Dialect::Yaml => scan_yaml(lines),
        Dialect::Json => Vec::new(),
    }
}

fn scan_toml<S: AsRef<str>>(lines: &[S]) -> Vec<KeyLine> {
    let mut keys = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].as_ref();
        if line.trim_start().starts_with('[') {
            break;
        }
        if let Some(caps) = toml_key_re().captures(line) {
            let whole = caps.get(0).map_or(0, |m| m.end());
            let end = toml_value_end(lines, i, &line[whole..]);
            keys.push(KeyLine {
                key: unquote(&caps[1]).to_string(),
                start: i,
                end,
            });
            i = end;
        } else {
            i += 1;
        }
    }
    keys
}

/// Line index after the value starting at `lines[start]`.
///
/// Follows multi-line arrays/inline tables (bracket depth) and multi-line
/// strings (`"""` / `'''`).
fn toml_value_end<S: AsRef<str>>(lines: &[S], start: usize, value: &str) -> usize {
    let value = value.trim_start();
    for delim in ["\"\"\"", "'''"] {
        if let Some(rest) = value.strip_prefix(delim) {
            if rest.contains(delim) {
                return start + 1;
            }
            let mut i = start + 1;
            while i < lines.len() {
                if lines[i].as_ref().contains(delim) {
                    return i + 1;
                }
                i += 1;
            }
            return lines.len();
        }
    }

    let mut depth = bracket_delta(value);
    let mut i = start + 1;
    while depth > 0 && i < lines.len() {
        depth += bracket_delta(lines[i].as_ref());
        i += 1;
    }
    i
}

/// Net `[`/`{` nesting change of a line, ignoring strings and comments.
fn bracket_delta(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in text.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' && q == '"' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '#' => break,
                '[' | '{' => depth += 1,
                ']' | '}' => depth -= 1,
                _ => {}
            },
        }
    }
    depth
}

fn scan_yaml<S: AsRef<str>>(lines: &[S]) -> Vec<KeyLine> {
    let mut keys: Vec<KeyLine> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].as_ref();
        let Some(caps) = yaml_key_re().captures(line) else {
            i += 1;
            continue;
        };

        // Continuation: indented lines, blank lines, and unindented `- `
        // sequence items belonging to this key.
        let mut end = i + 1;
        let mut last_content = i + 1;
        while end < lines.len() {
            let next = lines[end].as_ref();
            if next.trim().is_empty() {
                end += 1;
                continue;
            }
            let continues = next.starts_with(' ')
                || next.starts_with('\t')
                || next == "-"
                || next.starts_with("- ");
            if !continues {
                break;
            }
            end += 1;
            last_content = end;
        }

        keys.push(KeyLine {
            key: unquote(&caps[1]).to_string(),
            start: i,
            end: last_content,
        });
        i = last_content;
    }
    keys
}

/// Fail when any top-level key is defined more than once.
pub fn check_duplicates(content: &str, dialect: Dialect, path: &Path) -> Result<(), ConfigError> {
    let lines: Vec<&str> = content.lines().collect();
    let keys = scan_top_level(&lines, dialect);
    for (idx, entry) in keys.iter().enumerate() {
        if keys[..idx]
            .iter()
            .any(|prev| prev.key.eq_ignore_ascii_case(&entry.key))
        {
            return Err(ConfigError::DuplicateKey {
                file: path.to_path_buf(),
                key: entry.key.clone(),
            });
        }
    }
    Ok(())
}

/// Double-quoted string literal, valid in both TOML and YAML.
pub fn quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Flow-style list of string literals, valid in both TOML and YAML.
pub fn list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let inner: Vec<String> = items.iter().map(|s| quoted(s.as_ref())).collect();
    format!("[{}]", inner.join(", "))
}

/// An opened site config, edited in memory and committed atomically.
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    dialect: Dialect,
    original: String,
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
}

impl ConfigFile {
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let dialect = match Dialect::from_path(path) {
            Some(d @ (Dialect::Toml | Dialect::Yaml)) => d,
            _ => return Err(ConfigError::UnknownDialect(path.to_path_buf())),
        };
        let original = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Ok(Self::from_content(path, dialect, original))
    }

    fn from_content(path: &Path, dialect: Dialect, original: String) -> Self {
        let newline = if original.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = original.is_empty() || original.ends_with('\n');
        let lines = original.lines().map(String::from).collect();
        Self {
            path: path.to_path_buf(),
            dialect,
            original,
            lines,
            newline,
            trailing_newline,
        }
    }

    fn matches(&self, name: &str) -> Result<Option<KeyLine>, ConfigError> {
        let mut found = scan_top_level(&self.lines, self.dialect)
            .into_iter()
            .filter(|k| k.key.eq_ignore_ascii_case(name));
        let first = found.next();
        if found.next().is_some() {
            return Err(ConfigError::DuplicateKey {
                file: self.path.clone(),
                key: name.to_string(),
            });
        }
        Ok(first)
    }

    /// Set (`Some`) or delete (`None`) a top-level field.
    ///
    /// `value` is a raw literal in the file's dialect (see [`quoted`]).
    /// Replaces the first definition or prepends a new line; more than one
    /// definition is an error and leaves the file untouched.
    pub fn set_field(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let found = self.matches(name)?;

        match (found, value) {
            (Some(found), None) => {
                self.lines.drain(found.start..found.end);
            }
            (None, None) => {}
            (Some(found), Some(value)) => {
                let line = format!("{name}{}{value}", self.dialect.assign());
                let unchanged =
                    found.end == found.start + 1 && self.lines[found.start] == line;
                if !unchanged {
                    self.lines.splice(found.start..found.end, [line]);
                }
            }
            (None, Some(value)) => {
                let line = format!("{name}{}{value}", self.dialect.assign());
                let at = match self.dialect {
                    Dialect::Yaml if self.lines.first().is_some_and(|l| l.trim() == "---") => 1,
                    _ => 0,
                };
                self.lines.insert(at, line);
            }
        }
        Ok(())
    }

    /// Current content as it would be written.
    pub fn content(&self) -> String {
        let mut out = self.lines.join(self.newline);
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(self.newline);
        }
        out
    }

    pub fn is_changed(&self) -> bool {
        self.content() != self.original
    }

    /// Write the edits atomically. Returns `false` when nothing changed
    /// (and the file was not touched).
    pub fn commit(self) -> Result<bool, ConfigError> {
        if !self.is_changed() {
            return Ok(false);
        }
        atomic_write(&self.path, self.content().as_bytes())
            .map_err(|FsError { path, source, .. }| ConfigError::Io(path, source))?;
        Ok(true)
    }
}

/// Open, set one field, and commit.
pub fn set_config_field(path: &Path, name: &str, value: Option<&str>) -> Result<bool, ConfigError> {
    let mut file = ConfigFile::open(path)?;
    file.set_field(name, value)?;
    file.commit()
}
