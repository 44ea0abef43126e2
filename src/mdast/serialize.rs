//! Markdown AST → text.
//!
//! The AST is lowered into pulldown-cmark events and written out through
//! `pulldown-cmark-to-cmark`. Output conventions are fixed for the whole
//! migration: fenced code with three backticks, `-` list bullets, no GFM
//! extensions, so every post in a batch serializes the same way.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Tag, TagEnd};

use crate::error::{Error, Result};
use crate::mdast::MdNode;

/// Serialization conventions. Defaults match the migration output format;
/// the builder methods exist for tests and downstream reuse.
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Bullet character for unordered lists.
    pub list_token: char,
    /// Number of backticks around fenced code.
    pub code_fence_tokens: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            list_token: '-',
            code_fence_tokens: 3,
        }
    }
}

impl SerializeOptions {
    pub fn with_list_token(mut self, token: char) -> Self {
        self.list_token = token;
        self
    }

    pub fn with_code_fence_tokens(mut self, count: usize) -> Self {
        self.code_fence_tokens = count;
        self
    }
}

/// Serializes an AST root to markdown text.
pub fn serialize(tree: &MdNode, options: &SerializeOptions) -> Result<String> {
    let mut events = Vec::new();
    emit(tree, &mut events);

    let cmark_options = pulldown_cmark_to_cmark::Options {
        code_block_token_count: options.code_fence_tokens,
        list_token: options.list_token,
        ..Default::default()
    };

    let mut output = String::new();
    pulldown_cmark_to_cmark::cmark_with_options(events.into_iter(), &mut output, cmark_options)
        .map_err(|e| Error::Serialize(e.to_string()))?;

    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn emit(node: &MdNode, events: &mut Vec<Event<'static>>) {
    match node {
        MdNode::Root(children) => {
            for child in children {
                emit(child, events);
            }
        }
        MdNode::Paragraph(children) => {
            events.push(Event::Start(Tag::Paragraph));
            emit_all(children, events);
            events.push(Event::End(TagEnd::Paragraph));
        }
        MdNode::Heading { level, children } => {
            let level = heading_level(*level);
            events.push(Event::Start(Tag::Heading {
                level,
                id: None,
                classes: Vec::new(),
                attrs: Vec::new(),
            }));
            emit_all(children, events);
            events.push(Event::End(TagEnd::Heading(level)));
        }
        MdNode::BlockQuote(children) => {
            events.push(Event::Start(Tag::BlockQuote(None)));
            emit_all(children, events);
            events.push(Event::End(TagEnd::BlockQuote(None)));
        }
        MdNode::List { ordered, start, items } => {
            let start = if *ordered { Some(*start) } else { None };
            events.push(Event::Start(Tag::List(start)));
            emit_all(items, events);
            events.push(Event::End(TagEnd::List(*ordered)));
        }
        MdNode::ListItem(children) => {
            events.push(Event::Start(Tag::Item));
            emit_all(children, events);
            events.push(Event::End(TagEnd::Item));
        }
        MdNode::Code { lang, value } => {
            let info = lang.clone().unwrap_or_default();
            events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                CowStr::from(info),
            ))));
            let mut text = value.clone();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            events.push(Event::Text(CowStr::from(text)));
            events.push(Event::End(TagEnd::CodeBlock));
        }
        MdNode::Html(value) => {
            events.push(Event::Start(Tag::HtmlBlock));
            let mut text = value.clone();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            events.push(Event::Html(CowStr::from(text)));
            events.push(Event::End(TagEnd::HtmlBlock));
        }
        MdNode::ThematicBreak => events.push(Event::Rule),
        MdNode::Text(value) => emit_text(value, events),
        MdNode::Emphasis(children) => {
            events.push(Event::Start(Tag::Emphasis));
            emit_all(children, events);
            events.push(Event::End(TagEnd::Emphasis));
        }
        MdNode::Strong(children) => {
            events.push(Event::Start(Tag::Strong));
            emit_all(children, events);
            events.push(Event::End(TagEnd::Strong));
        }
        MdNode::InlineCode(value) => events.push(Event::Code(CowStr::from(value.clone()))),
        MdNode::Break => events.push(Event::HardBreak),
        MdNode::Link { url, title, children } => {
            events.push(Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                dest_url: CowStr::from(url.clone()),
                title: CowStr::from(title.clone().unwrap_or_default()),
                id: CowStr::from(String::new()),
            }));
            emit_all(children, events);
            events.push(Event::End(TagEnd::Link));
        }
        MdNode::Image { url, title, alt } => {
            events.push(Event::Start(Tag::Image {
                link_type: LinkType::Inline,
                dest_url: CowStr::from(url.clone()),
                title: CowStr::from(title.clone().unwrap_or_default()),
                id: CowStr::from(String::new()),
            }));
            if !alt.is_empty() {
                events.push(Event::Text(CowStr::from(alt.clone())));
            }
            events.push(Event::End(TagEnd::Image));
        }
    }
}

fn emit_all(children: &[MdNode], events: &mut Vec<Event<'static>>) {
    for child in children {
        emit(child, events);
    }
}

/// Text nodes may carry embedded newlines (the figure macro block does);
/// those become soft breaks so the writer keeps the lines apart.
fn emit_text(value: &str, events: &mut Vec<Event<'static>>) {
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            events.push(Event::SoftBreak);
        }
        if !line.is_empty() {
            events.push(Event::Text(CowStr::from(line.to_string())));
        }
    }
}

fn heading_level(level: u8) -> HeadingLevel {
    match level {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tree: MdNode) -> String {
        serialize(&tree, &SerializeOptions::default()).unwrap()
    }

    #[test]
    fn test_heading_and_paragraph() {
        let out = render(MdNode::Root(vec![
            MdNode::Heading {
                level: 2,
                children: vec![MdNode::text("Title")],
            },
            MdNode::paragraph_with_text("body text"),
        ]));
        assert!(out.contains("## Title"));
        assert!(out.contains("body text"));
    }

    #[test]
    fn test_fenced_code_with_language() {
        let out = render(MdNode::Root(vec![MdNode::Code {
            lang: Some("js".into()),
            value: "const x = 1;".into(),
        }]));
        assert!(out.contains("```js"), "got: {out}");
        assert!(out.contains("const x = 1;"));
    }

    #[test]
    fn test_unordered_list_uses_dash_bullets() {
        let out = render(MdNode::Root(vec![MdNode::List {
            ordered: false,
            start: 1,
            items: vec![
                MdNode::ListItem(vec![MdNode::text("one")]),
                MdNode::ListItem(vec![MdNode::text("two")]),
            ],
        }]));
        assert!(out.contains("- one"), "got: {out}");
        assert!(out.contains("- two"));
    }

    #[test]
    fn test_blockquote() {
        let out = render(MdNode::Root(vec![MdNode::BlockQuote(vec![
            MdNode::paragraph_with_text("quoted line"),
        ])]));
        assert!(out.contains("> quoted line"), "got: {out}");
    }

    #[test]
    fn test_link_and_image() {
        let out = render(MdNode::Root(vec![MdNode::Paragraph(vec![
            MdNode::Link {
                url: "https://example.com".into(),
                title: None,
                children: vec![MdNode::text("site")],
            },
            MdNode::text(" "),
            MdNode::Image {
                url: "./img/a.png".into(),
                title: None,
                alt: "alt text".into(),
            },
        ])]));
        assert!(out.contains("[site](https://example.com)"));
        assert!(out.contains("![alt text](./img/a.png)"));
    }

    #[test]
    fn test_html_passes_through_verbatim() {
        let out = render(MdNode::Root(vec![MdNode::Html(
            "<!-- /wp:core-embed/youtube -->".into(),
        )]));
        assert!(out.contains("<!-- /wp:core-embed/youtube -->"));
    }

    #[test]
    fn test_multiline_text_keeps_lines_apart() {
        let out = render(MdNode::Root(vec![MdNode::paragraph_with_text(
            "$Alt a $EndAlt\n$URL b $EndURL",
        )]));
        assert!(out.contains("$Alt a $EndAlt"));
        assert!(out.contains("$URL b $EndURL"));
        assert!(!out.contains("$EndAlt$URL"));
    }
}
