//! Hugo version parsing.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Dotted numeric version, e.g. `0.139.0`.
///
/// Missing trailing components compare as zero, so `1.0 == 1.0.0`.
#[derive(Debug, Clone)]
pub struct Version(Vec<u32>);

impl Version {
    /// Parse `0.139.0` or `v0.139.0`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('v');
        let parts: Option<Vec<u32>> = s.split('.').map(|p| p.parse().ok()).collect();
        parts.filter(|p| p.len() >= 2).map(Self)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bv?(\d+(?:\.\d+)+)").expect("valid version pattern"))
}

/// Leading version number in `hugo version` output.
///
/// `hugo v0.139.0-abc123+extended linux/amd64 BuildDate=...` gives `0.139.0`.
pub fn parse_version_output(raw: &str) -> Option<Version> {
    let caps = version_re().captures(raw)?;
    Version::parse(&caps[1])
}
