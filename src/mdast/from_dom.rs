//! HTML tree → Markdown AST conversion.
//!
//! Runs after the DOM passes have already reduced embeds, figures, and code
//! blocks to simple shapes. Block structure maps directly; inline content
//! accumulates into a buffer that is flushed into an implicit paragraph at
//! every block boundary (stray top-level text is common in exported posts).
//! Comments pass through as raw HTML so the component stage can still see
//! their payloads. Tables have no AST form and pass through serialized.

use crate::dom::{self, DomNode, Element};
use crate::mdast::MdNode;

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "blockquote", "pre", "hr", "table",
    "div", "figure",
];

/// Elements with no content of their own, unwrapped at block level.
const WRAPPER_TAGS: &[&str] = &[
    "div", "section", "article", "main", "aside", "header", "footer", "figure", "body",
];

/// Converts a parsed HTML tree into a Markdown AST root.
pub fn from_dom(tree: &DomNode) -> MdNode {
    MdNode::Root(convert_blocks(tree.children()))
}

fn convert_blocks(nodes: &[DomNode]) -> Vec<MdNode> {
    let mut blocks = Vec::new();
    let mut inline: Vec<MdNode> = Vec::new();

    for node in nodes {
        match node {
            DomNode::Comment(value) => {
                flush_inline(&mut inline, &mut blocks);
                blocks.push(MdNode::Html(format!("<!--{value}-->")));
            }
            DomNode::Text(value) => {
                // Inter-element whitespace is layout, not content.
                if value.trim().is_empty() && inline.is_empty() {
                    continue;
                }
                inline.push(MdNode::text(value.clone()));
            }
            DomNode::Element(el) => match el.tag.as_str() {
                "p" => {
                    flush_inline(&mut inline, &mut blocks);
                    let children = convert_inlines(&el.children);
                    if !is_blank(&children) {
                        blocks.push(MdNode::Paragraph(children));
                    }
                }
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.push(MdNode::Heading {
                        level: heading_level(&el.tag),
                        children: convert_inlines(&el.children),
                    });
                }
                "ul" | "ol" => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.push(convert_list(el));
                }
                "blockquote" => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.push(MdNode::BlockQuote(convert_blocks(&el.children)));
                }
                "pre" => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.push(convert_code(el));
                }
                "hr" => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.push(MdNode::ThematicBreak);
                }
                "table" => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.push(MdNode::Html(dom::serialize::serialize_element(el)));
                }
                tag if WRAPPER_TAGS.contains(&tag) => {
                    flush_inline(&mut inline, &mut blocks);
                    blocks.extend(convert_blocks(&el.children));
                }
                _ => inline.extend(convert_inline_element(el)),
            },
            DomNode::Root(children) => {
                flush_inline(&mut inline, &mut blocks);
                blocks.extend(convert_blocks(children));
            }
        }
    }

    flush_inline(&mut inline, &mut blocks);
    blocks
}

fn flush_inline(inline: &mut Vec<MdNode>, blocks: &mut Vec<MdNode>) {
    if inline.is_empty() {
        return;
    }
    let children = std::mem::take(inline);
    if !is_blank(&children) {
        blocks.push(MdNode::Paragraph(children));
    }
}

fn is_blank(children: &[MdNode]) -> bool {
    children
        .iter()
        .all(|c| matches!(c, MdNode::Text(t) if t.trim().is_empty()))
}

fn heading_level(tag: &str) -> u8 {
    match tag {
        "h1" => 1,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        _ => 6,
    }
}

fn convert_list(el: &Element) -> MdNode {
    let ordered = el.tag == "ol";
    let start = el
        .attr("start")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let items = el
        .children
        .iter()
        .filter_map(|child| child.as_element())
        .filter(|li| li.tag == "li")
        .map(|li| {
            if has_block_child(li) {
                MdNode::ListItem(convert_blocks(&li.children))
            } else {
                MdNode::ListItem(convert_inlines(&li.children))
            }
        })
        .collect();

    MdNode::List { ordered, start, items }
}

fn has_block_child(el: &Element) -> bool {
    el.children
        .iter()
        .filter_map(|c| c.as_element())
        .any(|c| BLOCK_TAGS.contains(&c.tag.as_str()))
}

fn convert_code(pre: &Element) -> MdNode {
    let lang = pre
        .children
        .iter()
        .filter_map(|c| c.as_element())
        .find(|c| c.tag == "code")
        .and_then(|code| {
            code.classes()
                .iter()
                .find_map(|c| c.strip_prefix("language-").map(str::to_string))
        });

    let value = pre.text_content().trim_end_matches('\n').to_string();
    MdNode::Code { lang, value }
}

fn convert_inlines(nodes: &[DomNode]) -> Vec<MdNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            DomNode::Text(value) => out.push(MdNode::text(value.clone())),
            DomNode::Comment(value) => out.push(MdNode::Html(format!("<!--{value}-->"))),
            DomNode::Element(el) => out.extend(convert_inline_element(el)),
            DomNode::Root(children) => out.extend(convert_inlines(children)),
        }
    }
    out
}

fn convert_inline_element(el: &Element) -> Vec<MdNode> {
    match el.tag.as_str() {
        "em" | "i" => vec![MdNode::Emphasis(convert_inlines(&el.children))],
        "strong" | "b" => vec![MdNode::Strong(convert_inlines(&el.children))],
        "code" => vec![MdNode::InlineCode(el.text_content())],
        "br" => vec![MdNode::Break],
        "a" => vec![MdNode::Link {
            url: el.attr("href").unwrap_or_default(),
            title: el.attr("title"),
            children: convert_inlines(&el.children),
        }],
        "img" => vec![MdNode::Image {
            url: el.attr("src").unwrap_or_default(),
            title: el.attr("title"),
            alt: el.attr("alt").unwrap_or_default(),
        }],
        // Unknown inline elements contribute their children only.
        _ => convert_inlines(&el.children),
    }
}
