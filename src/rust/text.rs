//! Light cleanup applied to raw input before tokenization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_PATTERN: Regex =
        Regex::new(r"http[^\s\x1C-\x1F]+|www[^\s\x1C-\x1F]+|https[^\s\x1C-\x1F]+")
            .expect("URL pattern is a valid regex");
}

/// Unicode whitespace plus the ASCII separators U+001C..=U+001F, which
/// Python's `str.split` and `\s` also treat as whitespace.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Removes URL-like tokens and collapses every whitespace run to one space.
///
/// Any token starting at `http` or `www` is dropped up to the next
/// whitespace. The result is trimmed, and `normalize("")` is `""`.
///
/// ```
/// use cattolingo::normalize;
///
/// assert_eq!(normalize("check http://cat.com now"), "check now");
/// assert_eq!(normalize("a   b\n\nc"), "a b c");
/// ```
pub fn normalize(text: &str) -> String {
    let without_urls = URL_PATTERN.replace_all(text, "");
    without_urls
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when there is nothing to classify.
pub fn is_blank(text: &str) -> bool {
    text.trim_matches(is_separator).is_empty()
}
