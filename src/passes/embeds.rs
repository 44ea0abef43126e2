//! Social and video embed normalization.
//!
//! Embeds arrive as iframes or provider-specific blockquotes full of
//! tracking scripts. Each recognized embed collapses to a bare paragraph
//! holding the canonical content URL, in the same tree position; later
//! stages either macro-ize it (YouTube) or leave the URL for the target
//! site's embed handling.

use regex::Regex;
use std::sync::LazyLock;

use super::DomPass;
use crate::diagnostics::Diagnostics;
use crate::dom::{self, DomNode, Element};
use crate::error::{Error, Result};

/// Providers whose iframes are worth keeping.
static RE_EMBED_ALLOWLIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.)?(youtube|youtu.be|codesandbox|codepen)").unwrap());

pub struct EmbedPass;

impl DomPass for EmbedPass {
    fn name(&self) -> &'static str {
        "embeds"
    }

    fn run(&self, tree: &mut DomNode, _diagnostics: &mut Diagnostics) -> Result<()> {
        dom::rewrite_nodes(tree, &mut |node| {
            let Some(el) = node.as_element() else {
                return Ok(None);
            };

            match el.tag.as_str() {
                "iframe" => Ok(normalize_iframe(el)),
                "blockquote" if el.has_class("twitter-tweet") => {
                    let url = last_anchor_href(el)
                        .ok_or(Error::EmbedMissingLink { platform: "twitter" })?;
                    Ok(Some(DomNode::paragraph_with_text(url)))
                }
                "blockquote" if el.has_class("instagram-media") => {
                    let url = instagram_url(el)
                        .ok_or(Error::EmbedMissingLink { platform: "instagram" })?;
                    Ok(Some(DomNode::paragraph_with_text(url)))
                }
                "p" if el.has_class("codepen") => {
                    let url = first_anchor_href(el)
                        .ok_or(Error::EmbedMissingLink { platform: "codepen" })?;
                    Ok(Some(DomNode::paragraph_with_text(url)))
                }
                _ => Ok(None),
            }
        })
    }
}

/// An allowlisted iframe becomes a paragraph with the canonical page URL;
/// anything else is left alone.
fn normalize_iframe(el: &Element) -> Option<DomNode> {
    let src = el.attr("src")?;
    if !RE_EMBED_ALLOWLIST.is_match(&src) {
        return None;
    }
    Some(DomNode::paragraph_with_text(canonical_url(&src)))
}

/// Rewrites an embed player URL to the page users actually visit.
fn canonical_url(src: &str) -> String {
    if src.contains("youtube") || src.contains("youtu.be") {
        src.replace("/embed/", "/watch?v=")
    } else if src.contains("codesandbox") {
        src.replace("/embed/", "/s/")
    } else {
        src.to_string()
    }
}

fn first_anchor_href(el: &Element) -> Option<String> {
    anchors(el).first().cloned()
}

fn last_anchor_href(el: &Element) -> Option<String> {
    anchors(el).last().cloned()
}

fn anchors(el: &Element) -> Vec<String> {
    let node = DomNode::Element(el.clone());
    dom::find_elements(&node, "a")
        .iter()
        .filter_map(|a| a.attr("href"))
        .collect()
}

/// The permalink attribute wins, stripped of its query string; otherwise
/// the first anchor in the block.
fn instagram_url(el: &Element) -> Option<String> {
    if let Some(permalink) = el.attr("data-instgrm-permalink") {
        let trimmed = permalink.split('?').next().unwrap_or(&permalink);
        return Some(trimmed.to_string());
    }
    first_anchor_href(el)
}
