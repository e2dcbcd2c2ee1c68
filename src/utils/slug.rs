//! Title to filename slugs.

/// Transliterate to ASCII, lowercase, and join alphanumeric runs with `-`.
///
/// `_` is treated as a separator too, so slugs stay pure dash-case.
///
/// ```ignore
/// assert_eq!(dash_case("Hello, World!"), "hello-world");
/// assert_eq!(dash_case("Crème brûlée"), "creme-brulee");
/// ```
pub fn dash_case(title: &str) -> String {
    let mut output = String::with_capacity(title.len());

    let mut need_dash = false;
    for ch in title.chars() {
        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            if b.is_ascii_alphanumeric() {
                if need_dash {
                    output.push('-');
                    need_dash = false;
                }
                output.push(b.to_ascii_lowercase() as char);
            } else {
                need_dash = !output.is_empty();
            }
        }
    }

    output
}

/// Filename for a new post: `<date>-<slug><ext>`, or `<slug><ext>` when no
/// date is given. `ext` includes its leading dot.
pub fn post_filename(date: Option<&str>, slug: &str, ext: &str) -> String {
    match date {
        Some(date) if !date.is_empty() => format!("{date}-{slug}{ext}"),
        _ => format!("{slug}{ext}"),
    }
}
