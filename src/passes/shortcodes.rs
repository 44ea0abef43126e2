//! WordPress shortcode cleanup on the Markdown AST.
//!
//! Three behaviors, in order of specificity:
//!
//! - embed shortcodes (`[youtube https://…]`) unwrap to the bare URL;
//! - `[caption …]` paragraphs are rebuilt: the shortcode text disappears
//!   and each link child collapses to the image it wraps;
//! - remaining `[name args]` and `[/name]` shortcodes are stripped from
//!   text.

use regex::Regex;
use std::sync::LazyLock;

use super::AstPass;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::mdast::{self, MdNode};

static RE_EMBED_SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\w+ (https?://[^\]\s]+)\]").unwrap());

// Open tags need arguments (`[name args]`) so bracketed prose like `[sic]`
// survives; close tags (`[/name]`) never carry any.
static RE_SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?:[a-zA-Z][\w-]* [^\]]*|/[a-zA-Z][\w-]*)\]").unwrap());

pub struct ShortcodePass;

impl AstPass for ShortcodePass {
    fn name(&self) -> &'static str {
        "shortcodes"
    }

    fn run(&self, tree: &mut MdNode, _diagnostics: &mut Diagnostics) -> Result<()> {
        mdast::rewrite_md_nodes(tree, &mut |node| {
            let MdNode::Paragraph(children) = node else {
                return Ok(None);
            };
            if !has_caption_shortcode(children) {
                return Ok(None);
            }
            Ok(Some(MdNode::Paragraph(rebuild_caption(children))))
        })?;

        mdast::for_each_text_mut(tree, &mut |text| {
            let unwrapped = RE_EMBED_SHORTCODE.replace_all(text, "$1");
            let stripped = RE_SHORTCODE.replace_all(&unwrapped, "");
            if stripped != *text {
                *text = stripped.into_owned();
            }
        });

        Ok(())
    }
}

fn has_caption_shortcode(children: &[MdNode]) -> bool {
    children
        .iter()
        .any(|c| matches!(c, MdNode::Text(t) if t.trim_start().starts_with("[caption")))
}

/// Keeps only the images: shortcode text goes away, links collapse to the
/// image node they wrap.
fn rebuild_caption(children: &[MdNode]) -> Vec<MdNode> {
    children
        .iter()
        .filter_map(|child| match child {
            MdNode::Link { children, .. } => children
                .iter()
                .find(|c| matches!(c, MdNode::Image { .. }))
                .cloned(),
            MdNode::Image { .. } => Some(child.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_pass(mut tree: MdNode) -> MdNode {
        let mut diagnostics = Diagnostics::new();
        ShortcodePass.run(&mut tree, &mut diagnostics).unwrap();
        tree
    }

    #[test]
    fn test_embed_shortcode_unwraps_to_url() {
        let tree = run_pass(MdNode::Root(vec![MdNode::paragraph_with_text(
            "[youtube https://youtu.be/abc123]",
        )]));
        assert_eq!(tree.children()[0].plain_text(), "https://youtu.be/abc123");
    }

    #[test]
    fn test_caption_paragraph_keeps_only_images() {
        let tree = run_pass(MdNode::Root(vec![MdNode::Paragraph(vec![
            MdNode::text("[caption id=\"attachment_1\" width=\"300\"]"),
            MdNode::Link {
                url: "https://example.com/full.png".into(),
                title: None,
                children: vec![MdNode::Image {
                    url: "https://example.com/thumb.png".into(),
                    title: Some("t".into()),
                    alt: "a thumbnail".into(),
                }],
            },
            MdNode::text(" A caption line.[/caption]"),
        ])]));

        let MdNode::Paragraph(children) = &tree.children()[0] else {
            panic!()
        };
        assert_eq!(children.len(), 1);
        assert!(matches!(
            &children[0],
            MdNode::Image { url, alt, .. }
                if url == "https://example.com/thumb.png" && alt == "a thumbnail"
        ));
    }

    #[test]
    fn test_other_shortcodes_are_stripped() {
        let tree = run_pass(MdNode::Root(vec![MdNode::paragraph_with_text(
            "[su_note color=\"red\"]important[/su_note] rest",
        )]));
        assert_eq!(tree.children()[0].plain_text(), "important rest");
    }

    #[test]
    fn test_bracketed_prose_survives() {
        let tree = run_pass(MdNode::Root(vec![MdNode::paragraph_with_text(
            "he wrote \"teh\" [sic] in the title",
        )]));
        assert_eq!(
            tree.children()[0].plain_text(),
            "he wrote \"teh\" [sic] in the title"
        );
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let tree = run_pass(MdNode::Root(vec![MdNode::paragraph_with_text(
            "nothing to do here",
        )]));
        assert_eq!(tree.children()[0].plain_text(), "nothing to do here");
    }
}
