//! Stage 1: Text pre-repair.
//!
//! Fixes applied to the raw HTML string before it ever reaches the parser:
//!
//! - double line breaks become an explicit empty-paragraph marker, because
//!   the exporter uses them as paragraph breaks and the parser would
//!   collapse them;
//! - whitespace sitting just before a closing `</em>`/`</strong>` moves to
//!   just after it;
//! - a closed catalog of WordPress block-comment markers is stripped, in
//!   normal, close, and escaped-close (`\/wp:`) forms.
//!
//! The catalog is exhaustive on purpose. Comment markers outside it (the
//! `wp:acf/*` and `wp:core-embed/*` component markers) carry payloads and
//! are handled at the AST stage instead.

use regex::Regex;
use std::sync::LazyLock;

static RE_PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r?\n){2}").unwrap());

static RE_SPACE_BEFORE_EM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" </em>").unwrap());

static RE_SPACE_BEFORE_STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" </strong>").unwrap());

/// Block-comment markers removed wholesale. Every marker type appears in
/// open, close, and escaped-close form where the exporter emits them.
static BLOCK_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"<!-- wp:block \{"ref":[0-9]+\} /-->"#,
        r#"<!-- wp:paragraph -->"#,
        r#"<!-- wp:paragraph \{"align":"[a-zA-Z]+"\} -->"#,
        r#"<!-- wp:paragraph \{"className":"[a-zA-Z\-]+"\} -->"#,
        r#"<!-- /wp:paragraph -->"#,
        r#"<!-- \\/wp:paragraph -->"#,
        r#"<!-- wp:heading -->"#,
        r#"<!-- wp:heading \{"level":[0-9]+\} -->"#,
        r#"<!-- /wp:heading -->"#,
        r#"<!-- \\/wp:heading -->"#,
        r#"<!-- wp:quote -->"#,
        r#"<!-- wp:quote \{"align":"left"\} -->"#,
        r#"<!-- /wp:quote -->"#,
        r#"<!-- \\/wp:quote -->"#,
        r#"<!-- wp:list -->"#,
        r#"<!-- wp:list \{[a-zA-Z":,0-9]+\} -->"#,
        r#"<!-- /wp:list -->"#,
        r#"<!-- \\/wp:list -->"#,
        r#"<!-- wp:table -->"#,
        r#"<!-- /wp:table -->"#,
        r#"<!-- \\/wp:table -->"#,
        r#"<!-- wp:tadv/classic-paragraph -->"#,
        r#"<!-- /wp:tadv/classic-paragraph -->"#,
        r#"<!-- \\/wp:tadv/classic-paragraph -->"#,
        r#"<!-- wp:spacer -->"#,
        r#"<!-- /wp:spacer -->"#,
        r#"<!-- \\/wp:spacer -->"#,
        r#"<!-- wp:separator -->"#,
        r#"<!-- /wp:separator -->"#,
        r#"<!-- \\/wp:separator -->"#,
        r#"<!-- wp:html -->"#,
        r#"<!-- /wp:html -->"#,
        r#"<!-- \\/wp:html -->"#,
        r#"<!-- wp:group -->"#,
        r#"<!-- /wp:group -->"#,
        r#"<!-- \\/wp:group -->"#,
        r#"<!-- wp:image -->"#,
        r#"<!-- wp:image \{[a-zA-Z":,0-9]+\} -->"#,
        r#"<!-- /wp:image -->"#,
        r#"<!-- \\/wp:image -->"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Repairs a raw exported HTML string. Pure text transformation, no I/O.
pub fn repair_html(html: &str) -> String {
    let mut result = RE_PARAGRAPH_BREAK.replace_all(html, "<p></p>").to_string();
    result = RE_SPACE_BEFORE_EM.replace_all(&result, "</em> ").to_string();
    result = RE_SPACE_BEFORE_STRONG
        .replace_all(&result, "</strong> ")
        .to_string();

    for marker in BLOCK_MARKERS.iter() {
        result = marker.replace_all(&result, "").to_string();
    }

    result
}
