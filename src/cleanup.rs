//! Final text cleanup over the serialized markdown.
//!
//! Two steps, in order:
//!
//! 1. un-escape underscores inside http(s) URLs (the markdown writer
//!    escapes `_` in text, which corrupts bare URLs);
//! 2. a markdown-aware reformat: parse and re-emit through pulldown-cmark
//!    so spacing and markers come out uniform, then normalize whitespace.
//!
//! The reformat falls back to its input when the round trip fails; a badly
//! spaced post beats a lost one.

use regex::Regex;
use std::sync::LazyLock;

/// An escaped underscore on a line that contains an http(s) URL before it
/// and more content after it. Variable-length lookbehind, so fancy-regex.
static RE_URL_UNDERSCORE: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(r"(?<=https?://.*)\\_(?=.*\n)").unwrap());

static RE_MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static RE_TRAILING_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// Un-escapes `\_` sequences that sit inside URLs.
pub fn fix_url_underscores(input: &str) -> String {
    RE_URL_UNDERSCORE.replace_all(input, "_").to_string()
}

/// Reformats markdown by round-tripping it through the parser.
///
/// Macro text and comment markers survive: they parse as plain text or
/// HTML blocks and re-emit verbatim.
pub fn reformat_markdown(input: &str) -> String {
    use pulldown_cmark::{Options, Parser};

    let parser = Parser::new_ext(input, Options::empty());
    let events: Vec<_> = parser.collect();

    let mut output = String::new();
    if pulldown_cmark_to_cmark::cmark(events.into_iter(), &mut output).is_err() {
        output = input.to_string();
    }

    normalize_whitespace(&output)
}

fn normalize_whitespace(input: &str) -> String {
    let mut result = RE_TRAILING_WHITESPACE.replace_all(input, "").to_string();
    result = RE_MULTIPLE_NEWLINES.replace_all(&result, "\n\n").to_string();
    let trimmed = result.trim_end();
    format!("{trimmed}\n")
}
