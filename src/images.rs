//! Image localization.
//!
//! Remote images referenced by a converted post are downloaded next to it
//! and the references rewritten to `./img/<name>`. Resolution is a
//! strictly sequential fold: each reference sees the text produced by the
//! previous one, so overlapping URLs can never race each other. A failed
//! download keeps the remote reference and records a diagnostic; the post
//! still ships.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};

/// Prefix of already-localized references. Running a migration twice must
/// not touch these again.
pub const LOCAL_PREFIX: &str = "./img";

static RE_SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).unwrap());

static RE_MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\((https?://[^)\s]+)\)").unwrap());

static RE_URL_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$URL (https?://\S+) \$EndURL").unwrap());

/// A downloaded image, ready to be written to the post's `img/` directory.
#[derive(Debug, Clone)]
pub struct LocalImage {
    /// Remote URL the image came from.
    pub url: String,
    /// File name under `img/`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw fetch result.
#[derive(Debug)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Image download abstraction; tests substitute an in-memory fetcher.
/// `Send + Sync` so one fetcher can serve a parallel batch.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// Blocking HTTP fetcher used by the batch driver.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Download {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .map_err(|e| Error::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .to_vec();

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}

/// Collects remote image references from converted content: `src`
/// attributes in passthrough HTML, markdown images, and `$URL` macro
/// blocks. Script references and already-local paths are skipped;
/// duplicates keep their first position.
pub fn scan_image_refs(content: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();

    let captures = RE_SRC_ATTR
        .captures_iter(content)
        .chain(RE_MD_IMAGE.captures_iter(content))
        .chain(RE_URL_MACRO.captures_iter(content));

    for capture in captures {
        let url = html_escape::decode_html_entities(&capture[1]).to_string();
        if url.ends_with(".js") || url.starts_with(LOCAL_PREFIX) {
            continue;
        }
        if !refs.contains(&url) {
            refs.push(url);
        }
    }

    refs
}

/// Downloads every reference in `content` (plus `extra_urls`, used for
/// hero candidates) and rewrites the text to point at the local copies.
///
/// Returns the rewritten content and the images to write out, in download
/// order.
pub fn resolve_images(
    content: &str,
    extra_urls: &[String],
    fetcher: &dyn ImageFetcher,
    diagnostics: &mut Diagnostics,
) -> (String, Vec<LocalImage>) {
    let mut text = content.to_string();
    let mut images: Vec<LocalImage> = Vec::new();

    let mut urls = scan_image_refs(content);
    for extra in extra_urls {
        if !urls.contains(extra) {
            urls.push(extra.clone());
        }
    }

    for url in urls {
        if images.iter().any(|img| img.url == url) {
            continue;
        }

        let fetched = match fetcher.fetch(&url) {
            Ok(fetched) => fetched,
            Err(err) => {
                diagnostics.warn("images", format!("download failed, keeping remote ref: {err}"));
                continue;
            }
        };

        if !is_image_response(&fetched) {
            diagnostics.warn(
                "images",
                format!("not an image, keeping remote ref: {url}"),
            );
            continue;
        }

        let file_name = file_name_for(&url, &fetched);
        text = text.replace(&url, &format!("{LOCAL_PREFIX}/{file_name}"));
        images.push(LocalImage {
            url,
            file_name,
            bytes: fetched.bytes,
        });
    }

    (text, images)
}

fn is_image_response(fetched: &FetchedImage) -> bool {
    match fetched.content_type.as_deref() {
        Some(ct) => ct.starts_with("image/") || ct.starts_with("application/octet-stream"),
        // No header at all: trust the bytes.
        None => true,
    }
}

/// Derives a flat file name from the URL path, appending a sniffed
/// extension when the path carries none.
fn file_name_for(url: &str, fetched: &FetchedImage) -> String {
    let path = url
        .split("://")
        .nth(1)
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path)
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);

    let mut name = path.trim_matches('/').replace('/', "-");
    if name.is_empty() {
        name = "image".to_string();
    }

    let last_segment_has_ext = name.rsplit('-').next().is_some_and(|s| s.contains('.'));
    if !last_segment_has_ext {
        name.push('.');
        name.push_str(extension_for(fetched));
    }
    name
}

fn extension_for(fetched: &FetchedImage) -> &'static str {
    match fetched.content_type.as_deref() {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        Some("image/svg+xml") => "svg",
        _ => sniff_extension(&fetched.bytes),
    }
}

/// Extension from magic bytes, `png` when nothing matches.
fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else if bytes
        .iter()
        .take(256)
        .map(|&b| b as char)
        .collect::<String>()
        .contains("<svg")
    {
        "svg"
    } else {
        "png"
    }
}
