//! `new-content` and `new-post`.
//!
//! Hugo creates the file from an archetype; the front matter is then
//! normalized to YAML and the file renamed to the requested extension, so
//! archetypes work the same for `.md`, `.Rmd` and `.Rmarkdown` content.

use crate::compiler::{PostMeta, edit_yaml, normalize_file};
use crate::config::Options;
use crate::generator::{Generator, GeneratorArgs};
use crate::log;
use crate::utils::date::DateTimeUtc;
use crate::utils::exec::Cmd;
use crate::utils::fs::{atomic_write, read_to_string, rename};
use crate::utils::path::to_slash;
use crate::utils::slug::{dash_case, post_filename};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Fields of a new post; `None` falls back to `[content]` defaults.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub subdir: Option<String>,
    pub ext: Option<String>,
    pub kind: Option<String>,
}

/// Create `path` (relative to the content dir) from an archetype.
pub fn new_content(
    options: &Options,
    generator: &Generator,
    path: &Path,
    kind: Option<&str>,
) -> Result<PathBuf> {
    let site = options.site()?;
    let rel = path.strip_prefix(site.content_dir()).unwrap_or(path);
    if rel.extension().is_none() {
        bail!("{} has no file extension", path.display());
    }

    let target = site.content_root().join(rel);
    if target.exists() {
        bail!("{} already exists", target.display());
    }
    // Hugo only applies archetypes to .md paths.
    let md_rel = rel.with_extension("md");
    let created = site.content_root().join(&md_rel);
    if created != target && created.exists() {
        bail!("{} is in the way", created.display());
    }

    generator.run(&GeneratorArgs::for_new_content(&to_slash(&md_rel), kind), site.root())?;
    if !created.is_file() {
        bail!("hugo did not create {}", created.display());
    }

    normalize_file(generator, &created, options.build.scratch_dir.as_deref())
        .with_context(|| format!("Failed to normalize front matter of {}", created.display()))?;
    if created != target {
        rename(&created, &target)?;
    }

    log!("new"; "{}", to_slash(&Path::new(site.content_dir()).join(rel)));
    Ok(target)
}

/// Create a post named `<subdir>/<date>-<slug><ext>` and fill in its
/// front matter.
pub fn new_post(options: &Options, generator: &Generator, post: &NewPost) -> Result<PathBuf> {
    let date = match &post.date {
        Some(date) => {
            DateTimeUtc::parse(date).with_context(|| format!("invalid date `{date}`, expected YYYY-MM-DD"))?;
            date.clone()
        }
        None => DateTimeUtc::today().to_ymd(),
    };

    let slug = match &post.slug {
        Some(slug) => dash_case(slug),
        None => dash_case(&post.title),
    };
    if slug.is_empty() {
        bail!("cannot derive a file name from `{}`; pass --slug", post.title);
    }

    let ext = match &post.ext {
        Some(ext) if ext.starts_with('.') => ext.clone(),
        Some(ext) => format!(".{ext}"),
        None => options.content.dotted_ext(),
    };
    let subdir = post.subdir.as_deref().unwrap_or(&options.content.subdir);
    let rel = Path::new(subdir).join(post_filename(Some(&date), &slug, &ext));

    let kind = post.kind.as_deref().or(options.content.kind.as_deref());
    let path = new_content(options, generator, &rel, kind)?;

    let meta = PostMeta {
        title: post.title.clone(),
        author: post.author.clone().or_else(|| options.content.author.clone()),
        date: Some(date),
        slug: Some(slug),
        categories: post.categories.clone(),
        tags: post.tags.clone(),
    };
    let content = read_to_string(&path)?;
    let edited = edit_yaml(&content, |fm| meta.apply(fm))
        .with_context(|| format!("Failed to edit front matter of {}", path.display()))?;
    atomic_write(&path, edited.as_bytes())?;
    Ok(path)
}

/// Open `path` in `$VISUAL` or `$EDITOR` and wait for it to exit.
pub fn open_in_editor(path: &Path) -> Result<()> {
    let editor = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty());
    let Some(editor) = editor else {
        log!("new"; "set $VISUAL or $EDITOR to open {}", path.display());
        return Ok(());
    };

    // Editors are often configured with flags, e.g. `code --wait`.
    let parts: Vec<&str> = editor.split_whitespace().collect();
    let status = Cmd::from_slice(&parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to start editor `{editor}`"))?;
    if !status.success() {
        log!("warn"; "editor `{}` exited with {}", editor, status);
    }
    Ok(())
}
