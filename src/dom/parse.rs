//! HTML fragment parsing.
//!
//! html5ever does the heavy lifting (and absorbs most of the malformed
//! markup WordPress exports contain); the resulting `RcDom` is immediately
//! lowered into the owned [`DomNode`] tree the pipeline passes mutate.

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{Attr, AttrValue, DomNode, Element};
use crate::error::{Error, Result};

/// Parses an HTML fragment into an owned tree.
///
/// Parsing itself is tolerant; the only hard failure is an input that
/// produces no tree at all, which would silently drop the whole post.
pub fn parse_fragment(html: &str) -> Result<DomNode> {
    let opts = ParseOpts::default();
    let dom: RcDom = html5ever::parse_fragment(
        RcDom::default(),
        opts,
        QualName::new(None, ns!(html), local_name!("body")),
        vec![],
    )
    .one(html);

    let root = lower_document(&dom.document);

    if root.children().is_empty() && !html.trim().is_empty() {
        return Err(Error::HtmlParse(
            "fragment produced an empty tree".to_string(),
        ));
    }

    Ok(root)
}

/// Lowers the rcdom document handle into a [`DomNode::Root`].
///
/// `parse_fragment` wraps the fragment in a synthetic `<html>` element;
/// that wrapper is peeled off so the root's children are the fragment's
/// own top-level nodes.
fn lower_document(document: &Handle) -> DomNode {
    let mut children = Vec::new();
    for child in document.children.borrow().iter() {
        if let Some(node) = lower_node(child) {
            children.push(node);
        }
    }

    if children.len() == 1 {
        if let DomNode::Element(el) = &children[0] {
            if el.tag == "html" {
                return DomNode::Root(el.children.clone());
            }
        }
    }

    DomNode::Root(children)
}

fn lower_node(handle: &Handle) -> Option<DomNode> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let mut element = Element::new(name.local.as_ref());
            for attr in attrs.borrow().iter() {
                let attr_name = attr.name.local.as_ref().to_string();
                let raw = attr.value.to_string();
                let value = if attr_name == "class" {
                    AttrValue::List(raw.split_whitespace().map(str::to_string).collect())
                } else {
                    AttrValue::Text(raw)
                };
                element.attrs.push(Attr {
                    name: attr_name,
                    value,
                });
            }
            for child in handle.children.borrow().iter() {
                if let Some(node) = lower_node(child) {
                    element.children.push(node);
                }
            }
            Some(DomNode::Element(element))
        }
        NodeData::Text { contents } => Some(DomNode::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(DomNode::Comment(contents.to_string())),
        // Doctype and processing instructions carry nothing we keep.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::find_elements;

    #[test]
    fn test_parse_simple_fragment() {
        let tree = parse_fragment("<p>hello <em>world</em></p>").unwrap();
        let paragraphs = find_elements(&tree, "p");
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text_content(), "hello world");
    }

    #[test]
    fn test_parse_preserves_comments() {
        let tree = parse_fragment("<p>a</p><!-- wp:acf/button {} /--><p>b</p>").unwrap();
        let has_comment = tree
            .children()
            .iter()
            .any(|n| matches!(n, DomNode::Comment(c) if c.contains("wp:acf/button")));
        assert!(has_comment);
    }

    #[test]
    fn test_parse_malformed_markup_recovers() {
        let tree = parse_fragment("<p>unclosed <strong>bold").unwrap();
        assert_eq!(find_elements(&tree, "strong").len(), 1);
    }

    #[test]
    fn test_parse_class_attribute_is_token_list() {
        let tree = parse_fragment(r#"<blockquote class="twitter-tweet centered"></blockquote>"#)
            .unwrap();
        let bq = &find_elements(&tree, "blockquote")[0];
        assert!(bq.has_class("twitter-tweet"));
        assert!(bq.has_class("centered"));
    }

    #[test]
    fn test_parse_attribute_order_is_preserved() {
        let tree =
            parse_fragment(r#"<marquee style="{{" border: ok bottom:>text</marquee>"#).unwrap();
        let el = &find_elements(&tree, "marquee")[0];
        assert_eq!(el.attrs[0].name, "style");
        assert_eq!(el.attrs[0].value.as_text(), "{{");
    }

    #[test]
    fn test_parse_empty_input_is_ok() {
        let tree = parse_fragment("").unwrap();
        assert!(tree.children().is_empty());
    }
}
