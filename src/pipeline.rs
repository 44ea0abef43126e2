//! The conversion pipeline.
//!
//! One post's HTML goes through a fixed stage order: text pre-repair,
//! fragment parsing, the DOM passes (code blocks, embeds, figures),
//! conversion to the Markdown AST, the AST passes (shortcodes,
//! components), serialization, and final text cleanup. Stages communicate
//! only through the tree they hand forward; recoverable problems land in
//! the per-run diagnostics, hard failures abort the post.

use crate::cleanup;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dom;
use crate::error::Result;
use crate::mdast::{self, SerializeOptions};
use crate::passes::{
    AstPass, CodeBlockPass, ComponentPass, DomPass, EmbedPass, FigurePass, ShortcodePass,
};
use crate::repair;

/// Conversion options.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub serialize: SerializeOptions,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serialize(mut self, serialize: SerializeOptions) -> Self {
        self.serialize = serialize;
        self
    }
}

/// The result of converting one post.
#[derive(Debug)]
pub struct Converted {
    pub markdown: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// A reusable HTML → markdown converter. Stateless between runs; one
/// instance can serve many posts, from many threads.
pub struct Pipeline {
    options: ConvertOptions,
    dom_passes: Vec<Box<dyn DomPass + Send + Sync>>,
    ast_passes: Vec<Box<dyn AstPass + Send + Sync>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            options,
            dom_passes: vec![
                Box::new(CodeBlockPass),
                Box::new(EmbedPass),
                Box::new(FigurePass),
            ],
            ast_passes: vec![Box::new(ShortcodePass), Box::new(ComponentPass)],
        }
    }

    /// Converts one post's HTML content to markdown.
    pub fn convert(&self, html: &str) -> Result<Converted> {
        let mut diagnostics = Diagnostics::new();

        let repaired = repair::repair_html(html);
        let mut tree = dom::parse_fragment(&repaired)?;

        for pass in &self.dom_passes {
            pass.run(&mut tree, &mut diagnostics)?;
        }

        let mut ast = mdast::from_dom(&tree);

        for pass in &self.ast_passes {
            pass.run(&mut ast, &mut diagnostics)?;
        }

        let markdown = mdast::serialize(&ast, &self.options.serialize)?;
        let markdown = cleanup::fix_url_underscores(&markdown);
        let markdown = cleanup::reformat_markdown(&markdown);
        // The round trip can re-escape underscores inside bare URLs.
        let markdown = cleanup::fix_url_underscores(&markdown);

        Ok(Converted {
            markdown,
            diagnostics: diagnostics.into_events(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn convert(html: &str) -> Converted {
        Pipeline::new().convert(html).unwrap()
    }

    #[test]
    fn test_plain_post() {
        let out = convert(concat!(
            "<!-- wp:heading {\"level\":2} --><h2>Section</h2><!-- /wp:heading -->",
            "<!-- wp:paragraph --><p>Some <strong>bold</strong> text.</p><!-- /wp:paragraph -->",
        ));
        assert!(out.markdown.contains("## Section"));
        assert!(out.markdown.contains("**bold**"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_code_block_post() {
        let out = convert("<pre lang=\"js\"><code>const x = 1;\n</code></pre>");
        assert!(out.markdown.contains("```js"));
        assert!(out.markdown.contains("const x = 1;"));
    }

    #[test]
    fn test_unsupported_language_is_reported_not_fatal() {
        let out = convert("<pre lang=\"cobol\"><code>MOVE A TO B.\n</code></pre>");
        assert!(out.markdown.contains("MOVE A TO B."));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].stage, "code-blocks");
    }

    #[test]
    fn test_youtube_block_post() {
        let out = convert(concat!(
            r#"<!-- wp:core-embed/youtube {"url":"https://youtu.be/abc","type":"video"} -->"#,
            r#"<figure class="wp-block-embed"><div>"#,
            "\nhttps://youtu.be/abc\n",
            "</div></figure>",
            "<!-- /wp:core-embed/youtube -->",
        ));
        assert!(out
            .markdown
            .contains("$YoutubeVideo(https://youtu.be/abc)$EndYoutubeVideo"));
        assert!(!out.markdown.contains("/wp:core-embed"));
    }

    #[test]
    fn test_figure_post() {
        let out = convert(concat!(
            "<figure>",
            r#"<img src="https://cdn.example/pic.png" alt="A pic">"#,
            "<figcaption>Caption here</figcaption>",
            "</figure>",
        ));
        assert!(out.markdown.contains("$Figure"));
        assert!(out.markdown.contains("$Alt A pic $EndAlt"));
        assert!(out.markdown.contains("$URL https://cdn.example/pic.png $EndURL"));
        assert!(out.markdown.contains("$Caption Caption here $EndCaption"));
        assert!(out.markdown.contains("$EndFigure"));
    }

    #[test]
    fn test_button_post() {
        let out = convert(
            r#"<p>intro</p><!-- wp:acf/button {"data":{"text":"Go","link":"https://example.com"}} /-->"#,
        );
        assert!(out.markdown.contains("{button}[Go](https://example.com){/button}"));
    }

    #[test]
    fn test_broken_tweet_aborts_post() {
        let result =
            Pipeline::new().convert(r#"<blockquote class="twitter-tweet"><p>x</p></blockquote>"#);
        assert!(matches!(
            result,
            Err(Error::EmbedMissingLink { platform: "twitter" })
        ));
    }

    #[test]
    fn test_double_newlines_split_paragraphs() {
        let out = convert("first line\n\nsecond line");
        assert!(out.markdown.contains("first line"));
        assert!(out.markdown.contains("second line"));
    }
}
