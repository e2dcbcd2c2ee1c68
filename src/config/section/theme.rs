//! `[theme]` section configuration.
//!
//! ```toml
//! [theme]
//! name = "hugo-lithium"       # Overrides the site config's `theme`
//! host = "github.com"         # Host for `owner/repo` theme references
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: Option<String>,
    pub host: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: None,
            host: "github.com".into(),
        }
    }
}
