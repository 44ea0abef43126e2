//! WXR export file parsing.
//!
//! A WordPress export is an RSS document: `rss > channel > item`, one item
//! per post, page, or attachment, with the interesting fields namespaced
//! (`content:encoded`, `wp:post_date`, `wp:postmeta`). Everything textual
//! arrives as CDATA. This parser pulls each item into a flat [`Post`]
//! record and leaves filtering and conversion to the caller.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

use crate::error::Result;

/// One `wp:postmeta` entry.
#[derive(Debug, Clone, Serialize)]
pub struct PostMeta {
    pub key: String,
    pub value: String,
}

/// One exported item, as found in the file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Post {
    pub title: String,
    /// Raw HTML body (`content:encoded`).
    pub content: String,
    /// Public permalink of the post on the old site.
    pub link: String,
    /// RFC 2822 publication date (`pubDate`), when present.
    pub pub_date: Option<String>,
    /// Site-local date (`wp:post_date`), the fallback when `pubDate` is
    /// absent or unparseable.
    pub post_date: Option<String>,
    pub post_type: String,
    pub categories: Vec<String>,
    pub meta: Vec<PostMeta>,
}

/// Parses a WXR export document into its items.
pub fn parse_export(xml: &str) -> Result<Vec<Post>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut posts = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"item" => {
                buf.clear();
                posts.push(parse_item(&mut reader)?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(posts)
}

/// Keeps only items of the given post type (`post`, `page`, ...).
pub fn posts_of_type(posts: Vec<Post>, post_type: &str) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|p| p.post_type == post_type)
        .collect()
}

fn parse_item(reader: &mut Reader<&[u8]>) -> Result<Post> {
    let mut post = Post::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                buf.clear();
                match name.as_str() {
                    "title" => post.title = collect_text(reader, "title")?,
                    "link" => post.link = collect_text(reader, "link")?,
                    "pubDate" => {
                        let value = collect_text(reader, "pubDate")?;
                        if !value.is_empty() {
                            post.pub_date = Some(value);
                        }
                    }
                    "category" => {
                        let value = collect_text(reader, "category")?;
                        if !value.is_empty() && !post.categories.contains(&value) {
                            post.categories.push(value);
                        }
                    }
                    "content:encoded" => {
                        post.content = collect_text(reader, "content:encoded")?;
                    }
                    "wp:post_date" => {
                        let value = collect_text(reader, "wp:post_date")?;
                        if !value.is_empty() {
                            post.post_date = Some(value);
                        }
                    }
                    "wp:post_type" => post.post_type = collect_text(reader, "wp:post_type")?,
                    "wp:postmeta" => {
                        if let Some(meta) = parse_postmeta(reader)? {
                            post.meta.push(meta);
                        }
                    }
                    _ => skip_element(reader, &name)?,
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"item" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(post)
}

fn parse_postmeta(reader: &mut Reader<&[u8]>) -> Result<Option<PostMeta>> {
    let mut key = None;
    let mut value = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                buf.clear();
                match name.as_str() {
                    "wp:meta_key" => key = Some(collect_text(reader, "wp:meta_key")?),
                    "wp:meta_value" => value = Some(collect_text(reader, "wp:meta_value")?),
                    _ => skip_element(reader, &name)?,
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"wp:postmeta" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(match (key, value) {
        (Some(key), Some(value)) => Some(PostMeta { key, value }),
        _ => None,
    })
}

/// Collects text and CDATA content up to the closing tag of `element`.
fn collect_text(reader: &mut Reader<&[u8]>, element: &str) -> Result<String> {
    let mut out = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => out.push_str(&t.unescape()?),
            Ok(Event::CData(t)) => out.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::End(e)) if e.name().as_ref() == element.as_bytes() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn skip_element(reader: &mut Reader<&[u8]>, element: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(e)) => {
                if depth == 0 && e.name().as_ref() == element.as_bytes() {
                    break;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
  <title>My Blog</title>
  <item>
    <title>First Post</title>
    <link>https://blog.example/2020/01/first-post/</link>
    <pubDate>Wed, 01 Jan 2020 10:00:00 +0000</pubDate>
    <category domain="category" nicename="rust"><![CDATA[Rust]]></category>
    <category domain="post_tag" nicename="intro"><![CDATA[Intro]]></category>
    <content:encoded><![CDATA[<p>Hello <strong>world</strong></p>]]></content:encoded>
    <wp:post_date><![CDATA[2020-01-01 10:00:00]]></wp:post_date>
    <wp:post_type><![CDATA[post]]></wp:post_type>
    <wp:postmeta>
      <wp:meta_key><![CDATA[_yoast_wpseo_metadesc]]></wp:meta_key>
      <wp:meta_value><![CDATA[A post about things.]]></wp:meta_value>
    </wp:postmeta>
  </item>
  <item>
    <title>About</title>
    <link>https://blog.example/about/</link>
    <content:encoded><![CDATA[<p>About me</p>]]></content:encoded>
    <wp:post_type><![CDATA[page]]></wp:post_type>
  </item>
</channel>
</rss>"#;

    #[test]
    fn test_parses_items_with_cdata_fields() {
        let posts = parse_export(SAMPLE).unwrap();
        assert_eq!(posts.len(), 2);

        let first = &posts[0];
        assert_eq!(first.title, "First Post");
        assert_eq!(first.content, "<p>Hello <strong>world</strong></p>");
        assert_eq!(first.pub_date.as_deref(), Some("Wed, 01 Jan 2020 10:00:00 +0000"));
        assert_eq!(first.post_date.as_deref(), Some("2020-01-01 10:00:00"));
        assert_eq!(first.post_type, "post");
        assert_eq!(first.categories, vec!["Rust", "Intro"]);
    }

    #[test]
    fn test_postmeta_key_value_pairs() {
        let posts = parse_export(SAMPLE).unwrap();
        assert_eq!(posts[0].meta.len(), 1);
        assert_eq!(posts[0].meta[0].key, "_yoast_wpseo_metadesc");
        assert_eq!(posts[0].meta[0].value, "A post about things.");
    }

    #[test]
    fn test_post_type_filter() {
        let posts = parse_export(SAMPLE).unwrap();
        let pages = posts_of_type(posts.clone(), "page");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "About");
        assert_eq!(posts_of_type(posts, "attachment").len(), 0);
    }

    #[test]
    fn test_empty_channel() {
        let posts = parse_export("<rss><channel></channel></rss>").unwrap();
        assert!(posts.is_empty());
    }
}
