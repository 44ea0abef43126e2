//! ACF and core-embed component blocks → site macro text.
//!
//! Component blocks survive the earlier stages as HTML comment nodes whose
//! body is a JSON payload. Each recognized marker is replaced by the macro
//! text the target site renders; the replacement is a raw `Html` node so
//! the serializer does not escape the macro's brackets. Malformed payloads
//! are reported and the marker is left in place.
//!
//! The pass also finishes two jobs other stages started: paragraphs that
//! carry a figure macro block get wrapped in `$Figure`/`$EndFigure`, and
//! leftover YouTube debris (close markers, bare watch URLs) is removed.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use super::AstPass;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::mdast::{self, MdNode};

// Payloads may span lines, so `.` has to cross newlines.
static RE_BUTTON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--\s*wp:acf/button\s+(\{.*\})\s*/-->$").unwrap());

static RE_ACCORDION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--\s*wp:acf/accordion\s+(\{.*\})\s*/-->$").unwrap());

static RE_HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--\s*wp:acf/highlight\s+(\{.*\})\s*/-->$").unwrap());

static RE_CTA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--\s*wp:acf/cta\s+(\{.*\})\s*/-->$").unwrap());

static RE_YOUTUBE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--\s*wp:core-embed/youtube\s+(\{.*\})\s*-->$").unwrap());

static RE_YOUTUBE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!--\s*/wp:core-embed/youtube\s*-->$").unwrap());

/// ACF block payload: the fields live under `data`, keyed flat.
#[derive(Debug, Deserialize)]
struct AcfPayload {
    #[serde(default)]
    data: serde_json::Map<String, serde_json::Value>,
}

impl AcfPayload {
    fn field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct YoutubePayload {
    url: String,
}

pub struct ComponentPass;

impl AstPass for ComponentPass {
    fn name(&self) -> &'static str {
        "components"
    }

    fn run(&self, tree: &mut MdNode, diagnostics: &mut Diagnostics) -> Result<()> {
        mdast::rewrite_md_nodes(tree, &mut |node| {
            Ok(match node {
                MdNode::Html(marker) => rewrite_marker(marker, diagnostics).map(MdNode::Html),
                // A paragraph carrying a figure macro block gets its frame.
                MdNode::Paragraph(_) if node.plain_text().contains("$EndAlt") => {
                    Some(MdNode::Html(format!(
                        "$Figure\n{}\n$EndFigure",
                        node.plain_text()
                    )))
                }
                _ => None,
            })
        })?;

        mdast::for_each_text_mut(tree, &mut |text| {
            let trimmed = text.trim_start();
            if trimmed.starts_with("https://www.youtube.com/watch?")
                || trimmed.starts_with("https://youtu.be/")
            {
                text.clear();
            }
        });

        prune_empty(tree);
        Ok(())
    }
}

fn rewrite_marker(marker: &str, diagnostics: &mut Diagnostics) -> Option<String> {
    if let Some(captures) = RE_BUTTON.captures(marker) {
        return parse_acf(&captures[1], "button", diagnostics).map(render_button);
    }
    if let Some(captures) = RE_ACCORDION.captures(marker) {
        return parse_acf(&captures[1], "accordion", diagnostics).map(render_accordion);
    }
    if let Some(captures) = RE_HIGHLIGHT.captures(marker) {
        return parse_acf(&captures[1], "highlight", diagnostics)
            .map(|p| render_wrapped(&p, "$I"));
    }
    if let Some(captures) = RE_CTA.captures(marker) {
        return parse_acf(&captures[1], "cta", diagnostics).map(|p| render_wrapped(&p, "$CTA"));
    }
    if let Some(captures) = RE_YOUTUBE.captures(marker) {
        return match serde_json::from_str::<YoutubePayload>(&captures[1]) {
            Ok(payload) => Some(format!("$YoutubeVideo({})$EndYoutubeVideo", payload.url)),
            Err(err) => {
                diagnostics.error("components", format!("malformed youtube payload: {err}"));
                None
            }
        };
    }
    if RE_YOUTUBE_CLOSE.is_match(marker) {
        return Some(String::new());
    }
    None
}

fn parse_acf(
    json: &str,
    component: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<AcfPayload> {
    match serde_json::from_str(json) {
        Ok(payload) => Some(payload),
        Err(err) => {
            diagnostics.error("components", format!("malformed {component} payload: {err}"));
            None
        }
    }
}

fn render_button(payload: AcfPayload) -> String {
    let text = payload
        .field("text")
        .or_else(|| payload.field("button_text"))
        .unwrap_or_default();
    let link = payload.field("link").unwrap_or_default();
    let open = if payload.field("style_as_secondary_button") == Some("1") {
        "{button secondary}"
    } else {
        "{button}"
    };
    format!("{open}[{text}]({link}){{/button}}")
}

/// Accordion sections are keyed `section_<i>_heading` and so on; the loop
/// stops at the first missing heading key.
fn render_accordion(payload: AcfPayload) -> String {
    let mut out = String::from("$Accordion\n");
    let mut index = 0usize;
    while let Some(heading) = payload.field(&format!("section_{index}_heading")) {
        let summary = payload
            .field(&format!("section_{index}_summary"))
            .unwrap_or_default();
        let content = payload
            .field(&format!("section_{index}_content"))
            .unwrap_or_default();
        out.push_str(&format!(
            "$Heading\n{heading}\n$EndHeading\n$Summary\n{summary}\n$EndSummary\n$Content\n{content}\n$EndContent\n"
        ));
        index += 1;
    }
    out.push_str("$EndAccordion");
    out
}

fn render_wrapped(payload: &AcfPayload, token: &str) -> String {
    let content = payload
        .field("content")
        .or_else(|| payload.field("text"))
        .unwrap_or_default();
    format!("{token} {content} {token}")
}

/// Drops paragraphs and raw nodes the cleanup above emptied out.
fn prune_empty(node: &mut MdNode) {
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            prune_empty(child);
        }
        children.retain(|child| match child {
            MdNode::Paragraph(inner) => !inner
                .iter()
                .all(|c| matches!(c, MdNode::Text(t) if t.trim().is_empty())),
            MdNode::Html(value) => !value.is_empty(),
            _ => true,
        });
    }
}
