//! # unwp
//!
//! A Rust library for converting WordPress WXR (XML) exports into
//! Markdown/MDX documents with YAML frontmatter and locally mirrored
//! images.
//!
//! ## Pipeline
//!
//! Each post's HTML body goes through a fixed stage order: text pre-repair,
//! tolerant HTML parsing, code-block recovery, embed and figure
//! normalization, conversion to a Markdown AST, shortcode and component
//! rewriting, serialization, and a final text cleanup. Recoverable problems
//! are collected as structured diagnostics alongside the markdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unwp::Pipeline;
//!
//! fn main() -> unwp::Result<()> {
//!     let pipeline = Pipeline::new();
//!     let converted = pipeline.convert("<p>Hello <strong>world</strong></p>")?;
//!
//!     println!("{}", converted.markdown);
//!     for event in &converted.diagnostics {
//!         eprintln!("[{}] {}", event.stage, event.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Whole export files are handled by [`batch::process_export_file`], which
//! writes one `<slug>/index.mdx` (plus `<slug>/img/`) per post.
//!
//! ## Features
//!
//! - `async`: async wrappers around conversion with Tokio

pub mod batch;
pub mod cleanup;
pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod export;
pub mod format;
pub mod frontmatter;
pub mod images;
pub mod mdast;
pub mod passes;
pub mod pipeline;
pub mod post;
pub mod repair;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use batch::{BatchOptions, BatchSummary};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use export::{parse_export, Post, PostMeta};
pub use frontmatter::Frontmatter;
pub use images::{HttpFetcher, ImageFetcher, LocalImage};
pub use mdast::SerializeOptions;
pub use pipeline::{ConvertOptions, Converted, Pipeline};

/// Converts one post's HTML body to markdown with default options.
///
/// # Example
///
/// ```
/// let converted = unwp::convert("<h2>Title</h2><p>text</p>")?;
/// assert!(converted.markdown.contains("## Title"));
/// # Ok::<(), unwp::Error>(())
/// ```
pub fn convert(html: &str) -> Result<Converted> {
    Pipeline::new().convert(html)
}
