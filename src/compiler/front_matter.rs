//! Front matter splitting and YAML field editing.
//!
//! Three fences are recognized at the very start of a document:
//!
//! ```text
//! ---        +++        {
//! yaml       toml         "json": 1
//! ---        +++        }
//! ```
//!
//! Only YAML is ever edited; other dialects are normalized to YAML by the
//! generator first (see [`super::scratch`]).

use serde_yaml_ng::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    Yaml,
    Toml,
    Json,
}

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("unterminated {0:?} front matter")]
    Unterminated(FrontMatterFormat),

    #[error("invalid YAML front matter")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("front matter is not a mapping")]
    NotMapping,

    #[error("expected YAML front matter, found {0:?}")]
    NotYaml(Option<FrontMatterFormat>),
}

/// A document cut at the end of its front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub format: Option<FrontMatterFormat>,
    /// Text between the fences (the whole object for JSON).
    pub inner: &'a str,
    /// The full block including fences and the trailing newline.
    pub block: &'a str,
    pub body: &'a str,
}

/// Split `content` into front matter and body.
pub fn split(content: &str) -> Result<Split<'_>, FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let first_line = content.lines().next().unwrap_or("").trim_end();

    match first_line {
        "---" => split_fenced(content, "---", FrontMatterFormat::Yaml),
        "+++" => split_fenced(content, "+++", FrontMatterFormat::Toml),
        _ if content.starts_with('{') => split_json(content),
        _ => Ok(Split {
            format: None,
            inner: "",
            block: "",
            body: content,
        }),
    }
}

fn split_fenced<'a>(
    content: &'a str,
    fence: &str,
    format: FrontMatterFormat,
) -> Result<Split<'a>, FrontMatterError> {
    let inner_start = content.find('\n').map_or(content.len(), |i| i + 1);
    let mut pos = inner_start;
    for line in content[inner_start..].split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == fence || (format == FrontMatterFormat::Yaml && trimmed == "...") {
            let end = pos + line.len();
            return Ok(Split {
                format: Some(format),
                inner: &content[inner_start..pos],
                block: &content[..end],
                body: &content[end..],
            });
        }
        pos += line.len();
    }
    Err(FrontMatterError::Unterminated(format))
}

fn split_json(content: &str) -> Result<Split<'_>, FrontMatterError> {
    let mut stream = serde_json::Deserializer::from_str(content).into_iter::<serde_json::Value>();
    match stream.next() {
        Some(Ok(serde_json::Value::Object(_))) => {
            let end = stream.byte_offset();
            let block_end = match content[end..].find('\n') {
                Some(i) if content[end..end + i].trim().is_empty() => end + i + 1,
                _ => end,
            };
            Ok(Split {
                format: Some(FrontMatterFormat::Json),
                inner: &content[..end],
                block: &content[..block_end],
                body: &content[block_end..],
            })
        }
        _ => Err(FrontMatterError::Unterminated(FrontMatterFormat::Json)),
    }
}

/// Editable YAML front matter. Key order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    map: Mapping,
}

impl FrontMatter {
    pub fn parse(inner: &str) -> Result<Self, FrontMatterError> {
        if inner.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_yaml_ng::from_str(inner)? {
            Value::Mapping(map) => Ok(Self { map }),
            Value::Null => Ok(Self::default()),
            _ => Err(FrontMatterError::NotMapping),
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.map
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .and_then(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.iter().any(|(k, _)| k.as_str() == Some(key))
    }

    /// Replace in place, or append.
    pub fn set_str(&mut self, key: &str, value: &str) {
        self.map
            .insert(Value::String(key.to_string()), Value::String(value.to_string()));
    }

    pub fn set_list<S: AsRef<str>>(&mut self, key: &str, items: &[S]) {
        let items = items
            .iter()
            .map(|s| Value::String(s.as_ref().to_string()))
            .collect();
        self.map
            .insert(Value::String(key.to_string()), Value::Sequence(items));
    }

    pub fn remove(&mut self, key: &str) {
        self.map = std::mem::take(&mut self.map)
            .into_iter()
            .filter(|(k, _)| k.as_str() != Some(key))
            .collect();
    }

    /// `---\n<yaml>---\n`
    pub fn to_block(&self) -> Result<String, FrontMatterError> {
        if self.map.is_empty() {
            return Ok("---\n---\n".to_string());
        }
        let yaml = serde_yaml_ng::to_string(&self.map)?;
        Ok(format!("---\n{yaml}---\n"))
    }
}

/// Metadata written into a new post.
#[derive(Debug, Clone, Default)]
pub struct PostMeta {
    pub title: String,
    pub author: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub slug: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl PostMeta {
    /// Set the post fields and drop `draft`.
    pub fn apply(&self, fm: &mut FrontMatter) {
        fm.set_str("title", &self.title);
        if let Some(author) = &self.author {
            fm.set_str("author", author);
        }
        if let Some(date) = &self.date {
            fm.set_str("date", date);
        }
        if let Some(slug) = &self.slug {
            fm.set_str("slug", slug);
        }
        if !self.categories.is_empty() {
            fm.set_list("categories", &self.categories);
        }
        if !self.tags.is_empty() {
            fm.set_list("tags", &self.tags);
        }
        fm.remove("draft");
    }
}

/// Edit the YAML front matter of `content`, keeping the body verbatim.
pub fn edit_yaml(
    content: &str,
    edit: impl FnOnce(&mut FrontMatter),
) -> Result<String, FrontMatterError> {
    let split = split(content)?;
    if !matches!(split.format, Some(FrontMatterFormat::Yaml) | None) {
        return Err(FrontMatterError::NotYaml(split.format));
    }
    let mut fm = FrontMatter::parse(split.inner)?;
    edit(&mut fm);
    Ok(format!("{}{}", fm.to_block()?, split.body))
}
