//! Hugo shortcode strings.
//!
//! ```ignore
//! let sc = Shortcode::new("tweet").arg("852205086956818432");
//! assert_eq!(sc.to_string(), r#"{{< tweet "852205086956818432" >}}"#);
//! ```

use std::fmt;

/// Delimiter style of a shortcode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// `{{< >}}`: inner content is raw HTML.
    #[default]
    Angle,
    /// `{{% %}}`: inner content is processed as markdown.
    Percent,
}

impl Delimiter {
    const fn pair(self) -> (&'static str, &'static str) {
        match self {
            Self::Angle => ("{{<", ">}}"),
            Self::Percent => ("{{%", "%}}"),
        }
    }
}

/// A shortcode invocation: name, positional and named parameters, and an
/// optional inner body (which produces the paired closing tag).
#[derive(Debug, Clone, Default)]
pub struct Shortcode {
    name: String,
    positional: Vec<String>,
    named: Vec<(String, String)>,
    inner: Option<String>,
    delimiter: Delimiter,
}

impl Shortcode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a CLI-style argument: `key=value` is named, anything else
    /// positional.
    pub fn param(self, raw: &str) -> Self {
        match raw.split_once('=') {
            Some((key, value)) if is_param_name(key) => self.named(key, value),
            _ => self.arg(raw),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn named(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.push((key.into(), value.into()));
        self
    }

    pub fn inner(mut self, body: impl Into<String>) -> Self {
        self.inner = Some(body.into());
        self
    }

    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }
}

fn is_param_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Double-quote a parameter value, escaping `"` and `\`.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

impl fmt::Display for Shortcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = self.delimiter.pair();
        write!(f, "{open} {}", self.name)?;
        for value in &self.positional {
            write!(f, " {}", quote(value))?;
        }
        for (key, value) in &self.named {
            write!(f, " {key}={}", quote(value))?;
        }
        write!(f, " {close}")?;

        if let Some(inner) = &self.inner {
            write!(f, "{inner}{open} /{} {close}", self.name)?;
        }
        Ok(())
    }
}
