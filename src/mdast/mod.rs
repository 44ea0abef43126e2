//! Markdown AST.
//!
//! The HTML tree is converted into this explicit tagged representation
//! before the shortcode and component stages run; working on typed nodes
//! instead of strings is what keeps those rewrites index-stable. The
//! variants mirror what the serializer can emit through pulldown-cmark
//! events. Anything markdown cannot express natively (tables, component
//! comment markers) rides along as an `Html` node.

pub mod from_dom;
pub mod serialize;

pub use from_dom::from_dom;
pub use serialize::{serialize, SerializeOptions};

/// A node in the Markdown AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdNode {
    Root(Vec<MdNode>),
    Paragraph(Vec<MdNode>),
    Heading { level: u8, children: Vec<MdNode> },
    BlockQuote(Vec<MdNode>),
    List { ordered: bool, start: u64, items: Vec<MdNode> },
    ListItem(Vec<MdNode>),
    Code { lang: Option<String>, value: String },
    /// Raw passthrough: comment markers, tables, anything markdown has no
    /// native form for.
    Html(String),
    ThematicBreak,
    Text(String),
    Emphasis(Vec<MdNode>),
    Strong(Vec<MdNode>),
    InlineCode(String),
    Break,
    Link { url: String, title: Option<String>, children: Vec<MdNode> },
    Image { url: String, title: Option<String>, alt: String },
}

impl MdNode {
    pub fn text(value: impl Into<String>) -> Self {
        MdNode::Text(value.into())
    }

    /// A paragraph holding a single text child.
    pub fn paragraph_with_text(value: impl Into<String>) -> Self {
        MdNode::Paragraph(vec![MdNode::Text(value.into())])
    }

    pub fn children(&self) -> &[MdNode] {
        match self {
            MdNode::Root(children)
            | MdNode::Paragraph(children)
            | MdNode::Heading { children, .. }
            | MdNode::BlockQuote(children)
            | MdNode::List { items: children, .. }
            | MdNode::ListItem(children)
            | MdNode::Emphasis(children)
            | MdNode::Strong(children)
            | MdNode::Link { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<MdNode>> {
        match self {
            MdNode::Root(children)
            | MdNode::Paragraph(children)
            | MdNode::Heading { children, .. }
            | MdNode::BlockQuote(children)
            | MdNode::List { items: children, .. }
            | MdNode::ListItem(children)
            | MdNode::Emphasis(children)
            | MdNode::Strong(children)
            | MdNode::Link { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        match self {
            MdNode::Text(value) | MdNode::InlineCode(value) => out.push_str(value),
            MdNode::Code { value, .. } => out.push_str(value),
            _ => {
                for child in self.children() {
                    child.append_text(out);
                }
            }
        }
    }
}

/// Rewrites matching nodes in place, preserving each node's position within
/// its parent's child sequence.
///
/// `f` returns `Some(replacement)` to substitute a node at its index, or
/// `None` to leave it and recurse into its children.
pub fn rewrite_md_nodes<F>(node: &mut MdNode, f: &mut F) -> crate::error::Result<()>
where
    F: FnMut(&MdNode) -> crate::error::Result<Option<MdNode>>,
{
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            if let Some(replacement) = f(child)? {
                *child = replacement;
            } else {
                rewrite_md_nodes(child, f)?;
            }
        }
    }
    Ok(())
}

/// Applies `f` to every text node in the tree.
pub fn for_each_text_mut<F>(node: &mut MdNode, f: &mut F)
where
    F: FnMut(&mut String),
{
    if let MdNode::Text(value) = node {
        f(value);
        return;
    }
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            for_each_text_mut(child, f);
        }
    }
}
