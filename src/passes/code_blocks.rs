//! Code-block normalization.
//!
//! WordPress exports mangle fenced code badly: JSX attribute values get
//! split across parser attributes, entities are double-encoded, and blank
//! lines inside blocks were already turned into `<p></p>` markers by the
//! pre-repair stage. This pass recovers the literal source text of every
//! `<pre>` block, reformats it when the language is known, and replaces the
//! block with a clean `pre > code` pair holding a single text child.

use regex::Regex;
use std::sync::LazyLock;

use super::DomPass;
use crate::diagnostics::Diagnostics;
use crate::dom::{self, Attr, AttrValue, DomNode, Element};
use crate::error::Result;
use crate::format::{self, FormatError, Profile};

/// Matches a quoted JSX-style expression attribute: `prop="{...}"`.
static RE_QUOTED_EXPR_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z][\w-]*)="\{(.*?)\}""#).unwrap());

static RE_OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(pre|code)[^>]*>").unwrap());

static RE_CLOSE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</(pre|code)>").unwrap());

pub struct CodeBlockPass;

impl DomPass for CodeBlockPass {
    fn name(&self) -> &'static str {
        "code-blocks"
    }

    fn run(&self, tree: &mut DomNode, diagnostics: &mut Diagnostics) -> Result<()> {
        dom::rewrite_nodes(tree, &mut |node| {
            let Some(el) = node.as_element() else {
                return Ok(None);
            };
            if el.tag != "pre" {
                return Ok(None);
            }
            Ok(Some(normalize_block(el, diagnostics)))
        })
    }
}

fn normalize_block(pre: &Element, diagnostics: &mut Diagnostics) -> DomNode {
    let lang = language_of(pre);

    let mut repaired = pre.clone();
    join_split_attributes(&mut repaired);

    let source = recover_source(&repaired);
    let formatted = match &lang {
        Some(tag) => match Profile::from_tag(tag).and_then(|p| format::format_source(p, &source)) {
            Ok(text) => text,
            Err(FormatError::UnsupportedLanguage(tag)) => {
                diagnostics.warn("code-blocks", format!("unsupported language: {tag}"));
                source
            }
            Err(FormatError::Syntax(message)) => {
                diagnostics.warn("code-blocks", format!("format failed ({message})"));
                source
            }
        },
        None => source,
    };

    let mut code = Element::new("code");
    if let Some(tag) = &lang {
        code.attrs.push(Attr {
            name: "class".into(),
            value: AttrValue::List(vec![format!("language-{tag}")]),
        });
    }
    code.children.push(DomNode::Text(formatted));

    let mut clean = Element::new("pre");
    clean.children.push(DomNode::Element(code));
    DomNode::Element(clean)
}

/// The language tag, from the `pre` itself or its `code` child.
fn language_of(pre: &Element) -> Option<String> {
    if let Some(lang) = pre.attr("lang") {
        return Some(lang);
    }
    for code in dom::find_elements(&DomNode::Element(pre.clone()), "code") {
        if let Some(lang) = code.attr("lang") {
            return Some(lang);
        }
        if let Some(class) = code.classes().iter().find_map(|c| {
            c.strip_prefix("language-").map(str::to_string)
        }) {
            return Some(class);
        }
    }
    None
}

/// Rejoins attribute values the HTML parser split apart.
///
/// `<Tag prop={{ a: '1' }}>` inside a code block parses as one attribute
/// whose value opens with `{{` followed by a run of fragment attributes,
/// the last of which ends with `}}`. The fragments are folded back into the
/// opening attribute's value, in source order.
fn join_split_attributes(el: &mut Element) {
    let mut joined: Vec<Attr> = Vec::with_capacity(el.attrs.len());
    let mut open: Option<Attr> = None;

    for attr in el.attrs.drain(..) {
        if let Some(pending) = open.as_mut() {
            let text = fragment_text(&attr);
            let done = text.ends_with("}}");
            if let AttrValue::Text(value) = &mut pending.value {
                value.push(' ');
                value.push_str(&text);
            }
            if done {
                if let Some(finished) = open.take() {
                    joined.push(finished);
                }
            }
        } else {
            let value = attr.value.as_text();
            if value.starts_with("{{") && !value.ends_with("}}") {
                open = Some(Attr {
                    name: attr.name,
                    value: AttrValue::Text(value),
                });
            } else {
                joined.push(attr);
            }
        }
    }
    if let Some(pending) = open {
        joined.push(pending);
    }
    el.attrs = joined;

    for child in &mut el.children {
        if let Some(child_el) = child.as_element_mut() {
            join_split_attributes(child_el);
        }
    }
}

fn fragment_text(attr: &Attr) -> String {
    let value = attr.value.as_text();
    if value.is_empty() {
        attr.name.clone()
    } else {
        format!("{}={}", attr.name, value)
    }
}

/// Recovers the literal source text from a repaired `pre` subtree.
fn recover_source(pre: &Element) -> String {
    let markup = dom::serialize::serialize_element(pre);

    let markup = RE_OPEN_TAG.replace_all(&markup, "");
    let markup = RE_CLOSE_TAG.replace_all(&markup, "");

    let mut text = html_escape::decode_html_entities(&markup).to_string();
    text = text.replace("<p></p>", "\n\n");

    // The serializer quoted expression attributes; unquote them until
    // nothing changes (values can nest).
    loop {
        let next = RE_QUOTED_EXPR_ATTR.replace_all(&text, "$1={$2}").to_string();
        if next == text {
            break;
        }
        text = next;
    }

    text = text.replace("&#39;", "\"").replace("&#34;", "\"");
    text
}
