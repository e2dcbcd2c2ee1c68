//! Isolated single-document projects for front matter conversion.
//!
//! `hugo convert` works on whole sites, so one document is converted by
//! copying it into a throwaway project:
//!
//! ```text
//! <tmp>/pressroom-XXXX/
//! ├── config.toml        # minimal synthetic config
//! └── content/
//!     └── document.md
//! ```
//!
//! The directory is removed when the [`ScratchProject`] is dropped, so no
//! exit path leaks it. [`ScratchProject::close`] surfaces removal errors.

use super::CompileError;
use super::front_matter::{FrontMatterError, FrontMatterFormat, split};
use crate::config::Dialect;
use crate::embed::site::SCRATCH_CONFIG;
use crate::generator::{Generator, GeneratorArgs};
use crate::utils::fs::{FsContext, FsError, create_dir_all, read_to_string};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Content file name inside the scratch project. Hugo only converts files
/// with a content extension it knows.
const DOCUMENT_NAME: &str = "document.md";

#[derive(Debug)]
pub struct ScratchProject {
    dir: TempDir,
}

impl ScratchProject {
    /// Create an empty project under `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> Result<Self, FsError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pressroom-");
        let dir = match parent {
            Some(parent) => {
                create_dir_all(parent)?;
                builder
                    .tempdir_in(parent)
                    .fs_context("create scratch directory in", parent)?
            }
            None => builder
                .tempdir()
                .fs_context("create scratch directory in", &std::env::temp_dir())?,
        };

        let root = dir.path();
        fs::write(root.join("config.toml"), SCRATCH_CONFIG)
            .fs_context("write", &root.join("config.toml"))?;
        create_dir_all(&root.join("content"))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content/<name>` and return its path.
    pub fn add_content(&self, name: &str, content: &str) -> Result<PathBuf, FsError> {
        let path = self.path().join("content").join(name);
        fs::write(&path, content).fs_context("write", &path)?;
        Ok(path)
    }

    /// Remove the project, reporting failures.
    pub fn close(self) -> Result<(), FsError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .fs_context("remove scratch directory", &path)
    }
}

/// Convert the front matter of `content` to YAML.
///
/// YAML and fence-less documents are returned unchanged without running the
/// generator. `source` only names the document in errors.
pub fn normalize_front_matter(
    generator: &Generator,
    source: &Path,
    content: &str,
    scratch_parent: Option<&Path>,
) -> Result<String, CompileError> {
    let front_matter_err = |e: FrontMatterError| CompileError::FrontMatter {
        path: source.to_path_buf(),
        source: e,
    };

    match split(content).map_err(front_matter_err)?.format {
        None | Some(FrontMatterFormat::Yaml) => return Ok(content.to_string()),
        Some(FrontMatterFormat::Toml | FrontMatterFormat::Json) => {}
    }

    let scratch = ScratchProject::create(scratch_parent)?;
    let document = scratch.add_content(DOCUMENT_NAME, content)?;

    generator
        .run(&GeneratorArgs::for_convert(Dialect::Yaml, true), scratch.path())
        .map_err(|e| CompileError::Convert {
            path: source.to_path_buf(),
            source: e,
        })?;

    let converted = read_to_string(&document)?;
    scratch.close()?;

    let format = split(&converted).map_err(front_matter_err)?.format;
    if format != Some(FrontMatterFormat::Yaml) {
        return Err(front_matter_err(FrontMatterError::NotYaml(format)));
    }
    Ok(converted)
}

/// Rewrite a content file in place so its front matter is YAML.
///
/// Returns `true` if the file changed.
pub fn normalize_file(
    generator: &Generator,
    path: &Path,
    scratch_parent: Option<&Path>,
) -> Result<bool, CompileError> {
    let content = read_to_string(path)?;
    let normalized = normalize_front_matter(generator, path, &content, scratch_parent)?;
    Ok(crate::utils::fs::write_if_changed(path, normalized.as_bytes())?)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::CancelToken;
    use crate::generator::fake;
    use crate::utils::fs::is_empty_dir;

    fn setup(body: &str) -> (TempDir, Generator, PathBuf) {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let generator =
            Generator::with_binary(fake::script(&bin, body)).with_cancel(CancelToken::new());
        let scratch_parent = dir.path().join("scratch");
        (dir, generator, scratch_parent)
    }

    #[test]
    fn test_toml_converted_and_scratch_removed() {
        let (_dir, generator, parent) = setup(fake::TOOLBOX);
        let out = normalize_front_matter(
            &generator,
            Path::new("content/a.Rmd"),
            "+++\ntitle = \"a\"\n+++\nHello\n",
            Some(&parent),
        )
        .unwrap();

        assert_eq!(out, "---\ntitle: converted\n---\nHello\n");
        assert!(is_empty_dir(&parent));
    }

    #[test]
    fn test_yaml_needs_no_generator() {
        let (_dir, generator, parent) = setup(fake::FAIL);
        let content = "---\ntitle: a\n---\nHello\n";
        let out =
            normalize_front_matter(&generator, Path::new("a.Rmd"), content, Some(&parent)).unwrap();
        assert_eq!(out, content);
        assert!(!parent.exists());
    }

    #[test]
    fn test_failure_removes_scratch() {
        let (_dir, generator, parent) = setup(fake::FAIL);
        let err = normalize_front_matter(
            &generator,
            Path::new("content/a.Rmd"),
            "+++\ntitle = \"a\"\n+++\n",
            Some(&parent),
        )
        .unwrap_err();

        match err {
            CompileError::Convert { path, source } => {
                assert_eq!(path, Path::new("content/a.Rmd"));
                assert!(source.to_string().contains("Error: boom"));
            }
            other => panic!("unexpected: {other}"),
        }
        assert!(is_empty_dir(&parent));
    }

    #[test]
    fn test_scratch_layout() {
        let parent = TempDir::new().unwrap();
        let scratch = ScratchProject::create(Some(parent.path())).unwrap();
        let root = scratch.path().to_path_buf();
        assert!(root.join("config.toml").is_file());
        assert!(root.join("content").is_dir());
        assert!(
            root.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("pressroom-")
        );

        drop(scratch);
        assert!(!root.exists());
    }
}
