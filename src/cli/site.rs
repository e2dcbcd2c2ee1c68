//! `new-site`: scaffold a Hugo site set up for compiled sources.
//!
//! # Steps
//! 1. Refuse a directory that already holds a project
//! 2. `hugo new site` in the chosen config format
//! 3. YAML default archetype, `ignoreFiles` for sources
//! 4. Theme install and sample post

use crate::config::{Dialect, Options, SiteConfig, list_literal, set_config_field};
use crate::embed::site::{
    ARCHETYPE_DEFAULT, ArchetypeVars, SAMPLE_POST, SAMPLE_POST_NAME, SamplePostVars,
};
use crate::generator::{Generator, GeneratorArgs};
use crate::log;
use crate::theme::{InstallOptions, ThemeReference, install_theme};
use crate::utils::date::DateTimeUtc;
use crate::utils::fs::{atomic_write, create_dir_all};
use crate::utils::path::normalize_path;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Patterns Hugo must skip: sources and knitting leftovers.
pub const SOURCE_IGNORE_PATTERNS: &[&str] = &[
    r"\.Rmd$",
    r"\.Rmarkdown$",
    r"_cache$",
    r"\.knit\.md$",
    r"\.utf8\.md$",
];

/// Entries that do not make a directory count as an existing project.
const TOLERATED_ENTRIES: &[&str] = &[".git", ".gitignore", "LICENSE", "README.md", ".Rproj.user"];

#[derive(Debug, Clone)]
pub struct NewSite {
    pub dir: PathBuf,
    pub format: Dialect,
    /// Theme reference; empty skips the install.
    pub theme: String,
    pub theme_example: bool,
    pub sample: bool,
    pub install_hugo: bool,
}

/// Create the site and return options rooted at it.
///
/// `options` supplies generator, theme and content settings; its root is
/// replaced by the new site directory.
pub fn new_site(options: &Options, site: &NewSite) -> Result<(Options, Generator)> {
    if site.format == Dialect::Json {
        bail!("JSON site configs are not supported; use toml or yaml");
    }
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let dir = normalize_path(&cwd.join(&site.dir));
    if !is_fresh_dir(&dir) {
        bail!("{} is not empty; pick an empty or new directory", dir.display());
    }

    let mut options = Options {
        root: dir.clone(),
        ..options.clone()
    };
    options.generator.install |= site.install_hugo;
    let generator = Generator::discover(&options)?;

    create_dir_all(&dir)?;
    generator.run(&GeneratorArgs::for_new_site(&dir, site.format), &dir)?;

    write_archetype(&options)?;
    let config = SiteConfig::load(&dir)?;
    set_config_field(config.path(), "ignoreFiles", Some(&list_literal(SOURCE_IGNORE_PATTERNS)))?;

    if !site.theme.is_empty() {
        let reference = ThemeReference::parse(&site.theme)?;
        let install = InstallOptions {
            example_site: site.theme_example,
            ..Default::default()
        };
        install_theme(&config, &reference, &options.theme.host, &install)
            .with_context(|| format!("Failed to install theme `{reference}`"))?;
    }

    if site.sample {
        write_sample_post(&options, &config)?;
    }

    log!("new"; "site created in {}", dir.display());
    Ok((options, generator))
}

/// Missing, empty, or holding only VCS and editor files.
fn is_fresh_dir(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return !dir.exists();
    };
    entries.filter_map(Result::ok).all(|entry| {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        TOLERATED_ENTRIES.contains(&name.as_ref()) || name.ends_with(".Rproj")
    })
}

fn write_archetype(options: &Options) -> Result<()> {
    let author = options.content.author.as_deref().unwrap_or("");
    let path = options.root_join("archetypes/default.md");
    atomic_write(&path, ARCHETYPE_DEFAULT.render(&ArchetypeVars { author }).as_bytes())?;
    Ok(())
}

fn write_sample_post(options: &Options, site: &SiteConfig) -> Result<()> {
    let date = DateTimeUtc::today().to_ymd();
    let author = options.content.author.as_deref().unwrap_or("Pressroom");
    let path = site
        .content_root()
        .join(&options.content.subdir)
        .join(format!("{date}-{SAMPLE_POST_NAME}"));
    let post = SAMPLE_POST.render(&SamplePostVars {
        author,
        date: &date,
    });
    atomic_write(&path, post.as_bytes())?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::generator::fake;
    use tempfile::TempDir;

    fn options(dir: &TempDir) -> Options {
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        let mut options = Options::for_root(dir.path());
        options.generator.binary = Some(fake::script(&dir.path().join("bin"), fake::TOOLBOX));
        options.content.author = Some("Ann".into());
        options
    }

    fn new_site_in(dir: PathBuf, format: Dialect) -> NewSite {
        NewSite {
            dir,
            format,
            theme: String::new(),
            theme_example: false,
            sample: true,
            install_hugo: false,
        }
    }

    #[test]
    fn test_new_site_yaml() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("blog");
        let (options, _) = new_site(&options(&dir), &new_site_in(target.clone(), Dialect::Yaml)).unwrap();

        assert_eq!(options.root, normalize_path(&target));
        let config = SiteConfig::load(&target).unwrap();
        assert_eq!(Dialect::from_path(config.path()).unwrap(), Dialect::Yaml);
        assert_eq!(config.ignore_files(), SOURCE_IGNORE_PATTERNS);

        let archetype = fs::read_to_string(target.join("archetypes/default.md")).unwrap();
        assert!(archetype.starts_with("---\n"));
        assert!(archetype.contains("author: 'Ann'"));

        let posts: Vec<_> = fs::read_dir(target.join("content/post"))
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].ends_with(SAMPLE_POST_NAME));
    }

    #[test]
    fn test_new_site_toml_ignore_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("site");
        let mut site = new_site_in(target.clone(), Dialect::Toml);
        site.sample = false;
        new_site(&options(&dir), &site).unwrap();

        let config = SiteConfig::load(&target).unwrap();
        assert_eq!(Dialect::from_path(config.path()).unwrap(), Dialect::Toml);
        assert_eq!(config.ignore_files(), SOURCE_IGNORE_PATTERNS);
        assert!(!target.join("content/post").exists());
    }

    #[test]
    fn test_refuses_non_empty_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("taken");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("index.html"), "").unwrap();

        let err = new_site(&options(&dir), &new_site_in(target.clone(), Dialect::Yaml)).unwrap_err();
        assert!(err.to_string().contains("not empty"));
        assert!(!target.join("hugo.yaml").exists());
    }

    #[test]
    fn test_fresh_dir() {
        let dir = TempDir::new().unwrap();
        assert!(is_fresh_dir(&dir.path().join("missing")));
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("blog.Rproj"), "").unwrap();
        assert!(is_fresh_dir(dir.path()));
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        assert!(!is_fresh_dir(dir.path()));
    }
}
