//! Pipeline passes.
//!
//! A conversion is a fixed sequence of passes over two trees: `DomPass`es
//! rewrite the parsed HTML tree, `AstPass`es rewrite the Markdown AST built
//! from it. Each pass is a small stateless object; the pipeline owns the
//! ordering. Recoverable problems go to the shared [`Diagnostics`] sink,
//! hard failures abort the post through `Result`.

pub mod code_blocks;
pub mod components;
pub mod embeds;
pub mod figures;
pub mod shortcodes;

pub use code_blocks::CodeBlockPass;
pub use components::ComponentPass;
pub use embeds::EmbedPass;
pub use figures::FigurePass;
pub use shortcodes::ShortcodePass;

use crate::diagnostics::Diagnostics;
use crate::dom::DomNode;
use crate::error::Result;
use crate::mdast::MdNode;

/// A pass over the parsed HTML tree.
pub trait DomPass {
    /// Stage name used in diagnostics.
    fn name(&self) -> &'static str;

    fn run(&self, tree: &mut DomNode, diagnostics: &mut Diagnostics) -> Result<()>;
}

/// A pass over the Markdown AST.
pub trait AstPass {
    /// Stage name used in diagnostics.
    fn name(&self) -> &'static str;

    fn run(&self, tree: &mut MdNode, diagnostics: &mut Diagnostics) -> Result<()>;
}
