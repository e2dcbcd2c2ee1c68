//! `[content]` section configuration.
//!
//! Defaults applied by `new-post` and `new-content`.
//!
//! ```toml
//! [content]
//! author = "Jane Doe"
//! subdir = "post"        # Directory under the content dir for new posts
//! ext = ".Rmd"           # Extension of new posts
//! kind = "post"          # Archetype kind passed to `hugo new -k`
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub author: Option<String>,
    pub subdir: String,
    pub ext: String,
    pub kind: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            author: None,
            subdir: "post".into(),
            ext: ".md".into(),
            kind: None,
        }
    }
}

impl ContentConfig {
    /// Extension with a leading dot, whichever way it was written.
    pub fn dotted_ext(&self) -> String {
        if self.ext.starts_with('.') {
            self.ext.clone()
        } else {
            format!(".{}", self.ext)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_options;

    #[test]
    fn test_content_defaults() {
        let options = test_parse_options("");
        assert_eq!(options.content.subdir, "post");
        assert_eq!(options.content.ext, ".md");
        assert!(options.content.author.is_none());
    }

    #[test]
    fn test_dotted_ext() {
        let options = test_parse_options("[content]\next = \"Rmd\"\nauthor = \"Jane\"");
        assert_eq!(options.content.dotted_ext(), ".Rmd");
        assert_eq!(options.content.author.as_deref(), Some("Jane"));
    }
}
