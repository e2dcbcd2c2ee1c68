//! Embedded files written into projects.
//!
//! - `template` - `__NAME__` placeholder substitution
//! - `site` - New-site files (default archetype, sample post) and the
//!   config of the scratch project used for front matter conversion
//!
//! # Usage
//!
//! ```ignore
//! use embed::site::{SAMPLE_POST, SamplePostVars};
//!
//! let post = SAMPLE_POST.render(&SamplePostVars { author: "Ann", date: "2024-01-01" });
//! ```

mod template;

pub use template::{Placeholders, Template};

pub mod site {
    use super::{Placeholders, Template};

    /// Minimal config for the isolated front matter conversion project.
    pub const SCRATCH_CONFIG: &str = include_str!("site/scratch-config.toml");

    /// Variables for the default archetype.
    pub struct ArchetypeVars<'a> {
        pub author: &'a str,
    }

    impl Placeholders for ArchetypeVars<'_> {
        fn pairs(&self) -> Vec<(&'static str, String)> {
            vec![("AUTHOR", self.author.replace('\'', "''"))]
        }
    }

    /// `archetypes/default.md` with YAML front matter.
    pub const ARCHETYPE_DEFAULT: Template<ArchetypeVars<'static>> =
        Template::new(include_str!("site/archetype-default.md"));

    /// Variables for the sample post.
    pub struct SamplePostVars<'a> {
        pub author: &'a str,
        pub date: &'a str,
    }

    impl Placeholders for SamplePostVars<'_> {
        fn pairs(&self) -> Vec<(&'static str, String)> {
            vec![
                ("AUTHOR", self.author.replace('"', "\\\"")),
                ("DATE", self.date.to_owned()),
            ]
        }
    }

    /// Sample `.Rmarkdown` post for new sites.
    pub const SAMPLE_POST: Template<SamplePostVars<'static>> =
        Template::new(include_str!("site/sample-post.Rmarkdown"));

    /// File name of the sample post under `content/post/`.
    pub const SAMPLE_POST_NAME: &str = "hello-pressroom.Rmarkdown";
}

#[cfg(test)]
mod tests {
    use super::site::*;
    use crate::compiler::front_matter::{FrontMatter, split};

    #[test]
    fn test_sample_post_front_matter() {
        let post = SAMPLE_POST.render(&SamplePostVars {
            author: "Ann \"A\" Lee",
            date: "2024-01-02",
        });
        let s = split(&post).unwrap();
        let fm = FrontMatter::parse(s.inner).unwrap();
        assert_eq!(fm.get_str("author"), Some("Ann \"A\" Lee"));
        assert_eq!(fm.get_str("date"), Some("2024-01-02"));
    }

    #[test]
    fn test_archetype_author_quoting() {
        let archetype = ARCHETYPE_DEFAULT.render(&ArchetypeVars { author: "O'Neil" });
        assert!(archetype.contains("author: 'O''Neil'"));
        assert!(archetype.contains("draft: true"));
    }

    #[test]
    fn test_scratch_config_is_toml() {
        let value: toml::Value = toml::from_str(SCRATCH_CONFIG).unwrap();
        assert_eq!(value["baseURL"].as_str(), Some("/"));
    }
}
