//! Captioned image normalization.
//!
//! A `figure` (or a legacy `wp-caption` wrapper) holding an image collapses
//! into a macro text block carrying the alt text, the image URL, and the
//! caption. The component stage later wraps the whole block in
//! `$Figure`/`$EndFigure` once it survives as AST text.

use super::DomPass;
use crate::diagnostics::Diagnostics;
use crate::dom::{self, DomNode, Element};
use crate::error::Result;

pub struct FigurePass;

impl DomPass for FigurePass {
    fn name(&self) -> &'static str {
        "figures"
    }

    fn run(&self, tree: &mut DomNode, _diagnostics: &mut Diagnostics) -> Result<()> {
        dom::rewrite_nodes(tree, &mut |node| {
            let Some(el) = node.as_element() else {
                return Ok(None);
            };
            if !is_figure(el) {
                return Ok(None);
            }
            let node = DomNode::Element(el.clone());
            let Some(img) = dom::find_elements(&node, "img").first().copied() else {
                return Ok(None);
            };

            let alt = img.attr("alt").unwrap_or_default();
            let src = img.attr("src").unwrap_or_default();
            let caption = dom::find_elements(&node, "figcaption")
                .first()
                .map(|fc| fc.text_content().trim().to_string())
                .unwrap_or_default();

            Ok(Some(DomNode::paragraph_with_text(format!(
                "$Alt {alt} $EndAlt\n$URL {src} $EndURL\n$Caption {caption} $EndCaption"
            ))))
        })
    }
}

fn is_figure(el: &Element) -> bool {
    el.tag == "figure" || el.has_class("wp-caption")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    fn run_pass(html: &str) -> DomNode {
        let mut tree = parse_fragment(html).unwrap();
        let mut diagnostics = Diagnostics::new();
        FigurePass.run(&mut tree, &mut diagnostics).unwrap();
        tree
    }

    #[test]
    fn test_figure_with_caption_becomes_macro_block() {
        let tree = run_pass(concat!(
            "<figure>",
            r#"<img src="https://cdn.example/a.png" alt="A diagram">"#,
            "<figcaption>The big picture</figcaption>",
            "</figure>",
        ));
        let text = dom::find_elements(&tree, "p")[0].text_content();
        assert_eq!(
            text,
            "$Alt A diagram $EndAlt\n$URL https://cdn.example/a.png $EndURL\n$Caption The big picture $EndCaption"
        );
    }

    #[test]
    fn test_missing_pieces_become_empty_strings() {
        let tree = run_pass(r#"<figure><img src="x.png"></figure>"#);
        let text = dom::find_elements(&tree, "p")[0].text_content();
        assert_eq!(
            text,
            "$Alt  $EndAlt\n$URL x.png $EndURL\n$Caption  $EndCaption"
        );
    }

    #[test]
    fn test_figure_without_image_is_left_alone() {
        let tree = run_pass("<figure><blockquote>quote</blockquote></figure>");
        assert_eq!(dom::find_elements(&tree, "figure").len(), 1);
    }

    #[test]
    fn test_legacy_caption_wrapper_matches() {
        let tree = run_pass(concat!(
            r#"<div class="wp-caption">"#,
            r#"<img src="b.jpg" alt="b">"#,
            "</div>",
        ));
        let text = dom::find_elements(&tree, "p")[0].text_content();
        assert!(text.starts_with("$Alt b $EndAlt"));
    }
}
