//! Body rendering.

use super::document::SourceKind;
use pulldown_cmark::{Options, Parser, html};

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Render a document body for its target format.
///
/// `.Rmd` bodies become HTML; `.Rmarkdown` bodies stay Markdown for the
/// generator to render.
pub fn render_body(kind: SourceKind, body: &str) -> String {
    match kind {
        SourceKind::Rmd => {
            let parser = Parser::new_ext(body, markdown_options());
            let mut out = String::with_capacity(body.len() * 3 / 2);
            html::push_html(&mut out, parser);
            out
        }
        SourceKind::Rmarkdown => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmd_renders_html() {
        let out = render_body(SourceKind::Rmd, "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~x~~\n");
        assert!(out.contains("<h1>Title</h1>"));
        assert!(out.contains("<table>"));
        assert!(out.contains("<del>x</del>"));
    }

    #[test]
    fn test_tasklist() {
        let out = render_body(SourceKind::Rmd, "- [x] done\n");
        assert!(out.contains("checkbox"));
    }

    #[test]
    fn test_rmarkdown_passthrough() {
        let body = "# Title\n\n```r\n1 + 1\n```\n";
        assert_eq!(render_body(SourceKind::Rmarkdown, body), body);
    }
}
