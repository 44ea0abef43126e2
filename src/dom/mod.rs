//! Owned HTML document tree.
//!
//! html5ever's `RcDom` is lowered into this owned, mutable tree right after
//! parsing so that pipeline passes can rewrite nodes in place without
//! touching reference-counted handles. A node is one of root, element, text,
//! or comment; elements keep their attributes in source order (the
//! code-block pass depends on that when it reassembles parser-split
//! attributes).

pub mod parse;
pub mod serialize;

pub use parse::parse_fragment;
pub use serialize::serialize_children;

/// Attribute value: plain text, or a whitespace-split token list
/// (`class` is the only multi-valued attribute we care about).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    List(Vec<String>),
}

impl AttrValue {
    /// The value as a single string (token lists joined by spaces).
    pub fn as_text(&self) -> String {
        match self {
            AttrValue::Text(s) => s.clone(),
            AttrValue::List(items) => items.join(" "),
        }
    }
}

/// One attribute, name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: AttrValue,
}

/// An element node: tag, ordered attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<DomNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Looks up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_text())
    }

    /// Class tokens of this element, empty when there is no class attribute.
    pub fn classes(&self) -> Vec<String> {
        match self.attrs.iter().find(|a| a.name == "class") {
            Some(Attr {
                value: AttrValue::List(items),
                ..
            }) => items.clone(),
            Some(Attr {
                value: AttrValue::Text(s),
                ..
            }) => s.split_whitespace().map(str::to_string).collect(),
            None => Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.append_text(&mut out);
        }
        out
    }
}

/// A node in the parsed HTML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    /// Synthetic single root holding the fragment's top-level nodes.
    Root(Vec<DomNode>),
    Element(Element),
    Text(String),
    /// Comment body without the `<!--`/`-->` delimiters.
    Comment(String),
}

impl DomNode {
    pub fn element(tag: impl Into<String>) -> Self {
        DomNode::Element(Element::new(tag))
    }

    /// A `<p>` holding a single text child. Embed passes reduce matched
    /// blocks to exactly this shape.
    pub fn paragraph_with_text(text: impl Into<String>) -> Self {
        let mut p = Element::new("p");
        p.children.push(DomNode::Text(text.into()));
        DomNode::Element(p)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn children(&self) -> &[DomNode] {
        match self {
            DomNode::Root(children) => children,
            DomNode::Element(el) => &el.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<DomNode>> {
        match self {
            DomNode::Root(children) => Some(children),
            DomNode::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }

    fn append_text(&self, out: &mut String) {
        match self {
            DomNode::Text(value) => out.push_str(value),
            DomNode::Element(el) => {
                for child in &el.children {
                    child.append_text(out);
                }
            }
            _ => {}
        }
    }
}

/// Collects all elements with the given tag, depth first.
///
/// A matched element is returned whole: the search does not descend into it
/// again, so nested matches resolve to the outermost node.
pub fn find_elements<'a>(node: &'a DomNode, tag: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_elements(node, tag, &mut found);
    found
}

fn collect_elements<'a>(node: &'a DomNode, tag: &str, found: &mut Vec<&'a Element>) {
    if let DomNode::Element(el) = node {
        if el.tag == tag {
            found.push(el);
            return;
        }
    }
    for child in node.children() {
        collect_elements(child, tag, found);
    }
}

/// Rewrites matching nodes in place, preserving each node's position within
/// its parent's child sequence.
///
/// `f` inspects a node and returns `Some(replacement)` to substitute it at
/// the same index, or `None` to leave it alone and recurse into its
/// children. Errors abort the walk.
pub fn rewrite_nodes<F>(node: &mut DomNode, f: &mut F) -> crate::error::Result<()>
where
    F: FnMut(&DomNode) -> crate::error::Result<Option<DomNode>>,
{
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            if let Some(replacement) = f(child)? {
                *child = replacement;
            } else {
                rewrite_nodes(child, f)?;
            }
        }
    }
    Ok(())
}

/// Applies `f` to every element matching `pred`, without descending into a
/// matched element.
pub fn for_each_element_mut<P, F>(node: &mut DomNode, pred: &P, f: &mut F) -> crate::error::Result<()>
where
    P: Fn(&Element) -> bool,
    F: FnMut(&mut Element) -> crate::error::Result<()>,
{
    if let DomNode::Element(el) = node {
        if pred(el) {
            return f(el);
        }
    }
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            for_each_element_mut(child, pred, f)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DomNode {
        let mut inner = Element::new("code");
        inner.children.push(DomNode::Text("let x = 1;".into()));
        let mut pre = Element::new("pre");
        pre.children.push(DomNode::Element(inner));
        let mut p = Element::new("p");
        p.children.push(DomNode::Text("hello".into()));
        DomNode::Root(vec![DomNode::Element(p), DomNode::Element(pre)])
    }

    #[test]
    fn test_find_elements_recursive() {
        let tree = sample_tree();
        assert_eq!(find_elements(&tree, "code").len(), 1);
        assert_eq!(find_elements(&tree, "pre").len(), 1);
        assert!(find_elements(&tree, "iframe").is_empty());
    }

    #[test]
    fn test_find_elements_stops_at_match() {
        // A pre inside a pre resolves to the outer node only.
        let mut inner = Element::new("pre");
        inner.children.push(DomNode::Text("inner".into()));
        let mut outer = Element::new("pre");
        outer.children.push(DomNode::Element(inner));
        let tree = DomNode::Root(vec![DomNode::Element(outer)]);
        assert_eq!(find_elements(&tree, "pre").len(), 1);
    }

    #[test]
    fn test_rewrite_preserves_position() {
        let mut tree = sample_tree();
        rewrite_nodes(&mut tree, &mut |node| {
            Ok(match node.as_element() {
                Some(el) if el.tag == "pre" => {
                    Some(DomNode::paragraph_with_text("replaced"))
                }
                _ => None,
            })
        })
        .unwrap();

        let children = tree.children();
        assert_eq!(children.len(), 2);
        // The paragraph stayed at index 0, the replacement took index 1.
        assert_eq!(children[0].as_element().unwrap().tag, "p");
        assert_eq!(children[1].as_element().unwrap().tag, "p");
        assert_eq!(
            children[1].as_element().unwrap().text_content(),
            "replaced"
        );
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let tree = sample_tree();
        if let DomNode::Root(children) = &tree {
            assert_eq!(children[1].as_element().unwrap().text_content(), "let x = 1;");
        }
    }

    #[test]
    fn test_classes_from_text_attr() {
        let mut el = Element::new("blockquote");
        el.attrs.push(Attr {
            name: "class".into(),
            value: AttrValue::Text("twitter-tweet centered".into()),
        });
        assert!(el.has_class("twitter-tweet"));
        assert!(!el.has_class("instagram-media"));
    }
}
