use ammonia::{Builder, UrlRelative};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Sanitizes stored post HTML before it is handed to a page.
pub fn sanitize_post_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::PassThrough)
        .clean(content)
        .to_string()
}

/// Strips markup and truncates to `max_chars` characters, appending an
/// ellipsis when anything was cut.
pub fn plain_text_excerpt(content: &str, max_chars: usize) -> String {
    let stripped = TAG_PATTERN.replace_all(content, " ");
    let text = WHITESPACE.replace_all(stripped.trim(), " ");
    truncate_chars(&text, max_chars)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
