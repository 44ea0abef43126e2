//! Post-level metadata derivation.
//!
//! Everything the frontmatter needs that is not the body itself: the slug
//! the output directory is named after, the publication date, the SEO
//! description, the redirect path from the old site, and the hero image.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{Error, Result};
use crate::export::{Post, PostMeta};

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Format used by `wp:post_date`.
const POST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derives the output slug from a post title: lowercased, punctuation
/// dropped, whitespace runs collapsed to single dashes.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let cleaned = RE_NON_WORD.replace_all(&lower, "");
    RE_WHITESPACE
        .replace_all(cleaned.trim(), "-")
        .to_string()
}

/// The publication date: `pubDate` (RFC 2822) when it parses, otherwise
/// `wp:post_date` in site-local format.
pub fn published_date(post: &Post) -> Result<NaiveDate> {
    if let Some(pub_date) = &post.pub_date {
        if let Ok(parsed) = DateTime::parse_from_rfc2822(pub_date) {
            return Ok(parsed.date_naive());
        }
    }
    if let Some(post_date) = &post.post_date {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(post_date, POST_DATE_FORMAT) {
            return Ok(parsed.date());
        }
    }
    Err(Error::BadDate(
        post.pub_date
            .clone()
            .or_else(|| post.post_date.clone())
            .unwrap_or_default(),
    ))
}

/// The longest description found among the SEO meta entries.
pub fn description(meta: &[PostMeta]) -> Option<String> {
    meta.iter()
        .filter(|m| m.key.contains("metadesc") || m.key.contains("description"))
        .map(|m| m.value.trim().to_string())
        .filter(|v| !v.is_empty())
        .max_by_key(String::len)
}

/// Social-card image URLs declared in postmeta, in declaration order.
pub fn hero_candidates(meta: &[PostMeta]) -> Vec<String> {
    meta.iter()
        .filter(|m| m.key.contains("opengraph-image") || m.key.contains("twitter-image"))
        .map(|m| m.value.trim().to_string())
        .filter(|v| v.starts_with("http"))
        .collect()
}

/// Picks the hero: the first downloaded image that is not an animated gif,
/// falling back to the site default.
pub fn hero_image(local_images: &[String], default: &str) -> String {
    local_images
        .iter()
        .find(|path| !path.to_lowercase().ends_with(".gif"))
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// The old site path of the post, for the frontmatter redirect list.
pub fn redirect_from(link: &str) -> Result<String> {
    let url = Url::parse(link)?;
    Ok(url.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(key: &str, value: &str) -> PostMeta {
        PostMeta {
            key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust  &  WebAssembly  "), "rust-webassembly");
        assert_eq!(slugify("Already-dashed title"), "already-dashed-title");
    }

    #[test]
    fn test_published_date_prefers_pub_date() {
        let post = Post {
            pub_date: Some("Wed, 01 Jan 2020 10:00:00 +0000".into()),
            post_date: Some("2021-06-15 08:00:00".into()),
            ..Default::default()
        };
        assert_eq!(
            published_date(&post).unwrap().to_string(),
            "2020-01-01"
        );
    }

    #[test]
    fn test_published_date_falls_back_to_post_date() {
        let post = Post {
            pub_date: Some("not a date".into()),
            post_date: Some("2021-06-15 08:00:00".into()),
            ..Default::default()
        };
        assert_eq!(
            published_date(&post).unwrap().to_string(),
            "2021-06-15"
        );
    }

    #[test]
    fn test_published_date_error_when_both_missing() {
        let post = Post::default();
        assert!(matches!(published_date(&post), Err(Error::BadDate(_))));
    }

    #[test]
    fn test_description_takes_longest_candidate() {
        let meta = vec![
            meta("_yoast_wpseo_metadesc", "short"),
            meta("custom_description", "a much longer description wins"),
            meta("unrelated", "ignored even though longest of all entries"),
        ];
        assert_eq!(
            description(&meta).as_deref(),
            Some("a much longer description wins")
        );
    }

    #[test]
    fn test_hero_candidates_require_http_values() {
        let meta = vec![
            meta("_yoast_wpseo_opengraph-image", "https://cdn.example/og.png"),
            meta("_yoast_wpseo_twitter-image", "not-a-url"),
        ];
        assert_eq!(hero_candidates(&meta), vec!["https://cdn.example/og.png"]);
    }

    #[test]
    fn test_hero_image_skips_gifs() {
        let images = vec!["./img/anim.gif".to_string(), "./img/still.png".to_string()];
        assert_eq!(hero_image(&images, "./default.png"), "./img/still.png");
        assert_eq!(
            hero_image(&["./img/only.gif".to_string()], "./default.png"),
            "./default.png"
        );
    }

    #[test]
    fn test_redirect_from_extracts_path() {
        assert_eq!(
            redirect_from("https://blog.example/2020/01/first-post/").unwrap(),
            "/2020/01/first-post/"
        );
    }
}
