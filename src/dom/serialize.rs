//! Serializing tree nodes back to markup text.
//!
//! Only the code-block pass needs this: it round-trips a repaired `<pre>`
//! subtree through markup so the literal source text can be recovered with
//! the same regex surgery the entity decoding expects.

use super::{AttrValue, DomNode, Element};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serializes an element, tags included.
pub fn serialize_element(el: &Element) -> String {
    let mut out = String::new();
    write_element(el, &mut out);
    out
}

/// Serializes a node sequence to markup text.
pub fn serialize_children(children: &[DomNode]) -> String {
    let mut out = String::new();
    for child in children {
        write_node(child, &mut out);
    }
    out
}

fn write_node(node: &DomNode, out: &mut String) {
    match node {
        DomNode::Root(children) => {
            for child in children {
                write_node(child, out);
            }
        }
        DomNode::Element(el) => write_element(el, out),
        DomNode::Text(value) => out.push_str(&html_escape::encode_text(value)),
        DomNode::Comment(value) => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for attr in &el.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        let value = match &attr.value {
            AttrValue::Text(s) => s.clone(),
            AttrValue::List(items) => items.join(" "),
        };
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    for child in &el.children {
        write_node(child, out);
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    #[test]
    fn test_round_trip_simple_element() {
        let tree = parse_fragment("<pre><code>let x = 1 &lt; 2;</code></pre>").unwrap();
        let html = serialize_children(tree.children());
        assert_eq!(html, "<pre><code>let x = 1 &lt; 2;</code></pre>");
    }

    #[test]
    fn test_attributes_are_quoted() {
        let tree = parse_fragment(r#"<pre lang="js"><code>x</code></pre>"#).unwrap();
        let html = serialize_children(tree.children());
        assert_eq!(html, r#"<pre lang="js"><code>x</code></pre>"#);
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let tree = parse_fragment(r#"<p><img src="a.png" alt="a"></p>"#).unwrap();
        let html = serialize_children(tree.children());
        assert_eq!(html, r#"<p><img src="a.png" alt="a"></p>"#);
    }

    #[test]
    fn test_comment_round_trip() {
        let tree = parse_fragment("<!-- marker -->").unwrap();
        let html = serialize_children(tree.children());
        assert_eq!(html, "<!-- marker -->");
    }
}
