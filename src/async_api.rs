//! Async API for non-blocking conversion.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! unwp = { version = "0.1", features = ["async"] }
//! ```

use crate::error::Result;
use crate::pipeline::Converted;
use std::path::Path;
use tokio::fs;

/// Asynchronously converts one post's HTML body to markdown.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unwp::Result<()> {
/// let converted = unwp::async_api::convert("<p>Hello</p>").await?;
/// println!("{}", converted.markdown);
/// # Ok(())
/// # }
/// ```
pub async fn convert(html: &str) -> Result<Converted> {
    // Conversion is CPU-bound, so it runs in a blocking task
    let html = html.to_string();
    tokio::task::spawn_blocking(move || crate::convert(&html))
        .await
        .map_err(|e| crate::error::Error::Io(std::io::Error::other(e.to_string())))?
}

/// Asynchronously parses a WXR export file into its items.
pub async fn parse_export_file(path: impl AsRef<Path>) -> Result<Vec<crate::export::Post>> {
    let xml = fs::read_to_string(path).await?;
    tokio::task::spawn_blocking(move || crate::export::parse_export(&xml))
        .await
        .map_err(|e| crate::error::Error::Io(std::io::Error::other(e.to_string())))?
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    async fn test_async_convert() {
        let converted = super::convert("<h2>Hi</h2>").await.unwrap();
        assert!(converted.markdown.contains("## Hi"));
    }
}
