//! Batch conversion of whole export files.
//!
//! One export file becomes one `out-<name>` directory with a
//! `<slug>/index.mdx` (frontmatter + markdown) and `<slug>/img/` per post.
//! Output directories are assigned up front so slug collisions resolve
//! deterministically; the posts themselves convert in parallel, and one
//! failing post never takes its siblings down.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::export::{self, Post};
use crate::frontmatter::Frontmatter;
use crate::images::{self, ImageFetcher, LocalImage, LOCAL_PREFIX};
use crate::pipeline::Pipeline;
use crate::post;

/// Batch settings.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Which `wp:post_type` to convert.
    pub post_type: String,
    /// Hero used when a post has no usable image.
    pub default_hero: String,
    /// Skip downloads and keep remote image references.
    pub skip_images: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            post_type: "post".to_string(),
            default_hero: "./hero.png".to_string(),
            skip_images: false,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self
    }

    pub fn with_default_hero(mut self, hero: impl Into<String>) -> Self {
        self.default_hero = hero.into();
        self
    }

    pub fn with_skip_images(mut self, skip: bool) -> Self {
        self.skip_images = skip;
        self
    }
}

/// What a batch run did.
#[derive(Debug)]
pub struct BatchSummary {
    pub out_dir: PathBuf,
    pub converted: usize,
    pub failed: usize,
}

/// Converts every matching post in an export file.
pub fn process_export_file(
    export_path: &Path,
    fetcher: &dyn ImageFetcher,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let xml = fs::read_to_string(export_path)?;
    let posts = export::posts_of_type(export::parse_export(&xml)?, &options.post_type);

    let stem = export_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export");
    let out_dir = export_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("out-{stem}"));
    fs::create_dir_all(&out_dir)?;

    let assigned = assign_directories(&posts, &out_dir);
    let pipeline = Pipeline::new();

    let failed = assigned
        .par_iter()
        .map(|(post, dir)| {
            match process_post(post, dir, &pipeline, fetcher, options) {
                Ok(()) => {
                    log::info!("converted \"{}\" -> {}", post.title, dir.display());
                    0usize
                }
                Err(err) => {
                    log::error!("failed to convert \"{}\": {err}", post.title);
                    1usize
                }
            }
        })
        .sum::<usize>();

    Ok(BatchSummary {
        out_dir,
        converted: assigned.len() - failed,
        failed,
    })
}

/// Assigns an output directory per post. A slug that is already taken, in
/// this batch or on disk, gets a numeric suffix (`-2`, `-3`, ...).
fn assign_directories<'a>(posts: &'a [Post], out_dir: &Path) -> Vec<(&'a Post, PathBuf)> {
    let mut taken: Vec<String> = Vec::new();
    posts
        .iter()
        .map(|p| {
            let base = post::slugify(&p.title);
            let base = if base.is_empty() { "untitled".to_string() } else { base };

            let mut slug = base.clone();
            let mut n = 1usize;
            while taken.contains(&slug) || out_dir.join(&slug).exists() {
                n += 1;
                slug = format!("{base}-{n}");
            }
            taken.push(slug.clone());
            (p, out_dir.join(slug))
        })
        .collect()
}

/// Converts a single post and writes `index.mdx` plus its images.
pub fn process_post(
    post: &Post,
    dir: &Path,
    pipeline: &Pipeline,
    fetcher: &dyn ImageFetcher,
    options: &BatchOptions,
) -> Result<()> {
    if post.content.trim().is_empty() {
        return Err(Error::MissingField("content:encoded"));
    }

    let converted = pipeline.convert(&post.content)?;

    let (markdown, local_images) = if options.skip_images {
        (converted.markdown, Vec::new())
    } else {
        let mut diagnostics = Diagnostics::new();
        let heroes = post::hero_candidates(&post.meta);
        let (markdown, local_images) =
            images::resolve_images(&converted.markdown, &heroes, fetcher, &mut diagnostics);
        (markdown, local_images)
    };

    let frontmatter = Frontmatter {
        title: post.title.clone(),
        description: post::description(&post.meta),
        published: post::published_date(post)?,
        redirect_from: post::redirect_from(&post.link).into_iter().collect(),
        categories: post.categories.clone(),
        hero: hero_of(&local_images, &options.default_hero),
    };

    fs::create_dir_all(dir)?;
    write_images(dir, &local_images)?;
    fs::write(
        dir.join("index.mdx"),
        format!("{}\n{}", frontmatter.render(), markdown),
    )?;

    Ok(())
}

fn hero_of(local_images: &[LocalImage], default: &str) -> String {
    let paths: Vec<String> = local_images
        .iter()
        .map(|img| format!("{LOCAL_PREFIX}/{}", img.file_name))
        .collect();
    post::hero_image(&paths, default)
}

fn write_images(dir: &Path, local_images: &[LocalImage]) -> Result<()> {
    if local_images.is_empty() {
        return Ok(());
    }
    let img_dir = dir.join("img");
    fs::create_dir_all(&img_dir)?;
    for image in local_images {
        fs::write(img_dir.join(&image.file_name), &image.bytes)?;
    }
    Ok(())
}
