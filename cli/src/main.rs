//! unwp CLI - WordPress export migration tool
//!
//! A command-line tool for converting WordPress WXR export files into
//! per-post Markdown/MDX directories.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use unwp::{batch, BatchOptions, HttpFetcher};

/// WordPress WXR export conversion to Markdown/MDX
#[derive(Parser)]
#[command(
    name = "unwp",
    version,
    about = "Convert WordPress XML exports to Markdown/MDX",
    long_about = "unwp - WordPress export migration tool.\n\n\
                  Converts each post in one or more WXR export files into a\n\
                  <slug>/index.mdx directory with YAML frontmatter and locally\n\
                  mirrored images.\n\n\
                  Usage:\n  \
                  unwp convert export.xml           Convert posts to out-export/\n  \
                  unwp convert a.xml b.xml          Convert several exports\n  \
                  unwp list export.xml              List convertible posts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert export files (one out-<name> directory per file)
    Convert {
        /// WXR export file paths
        #[arg(required = true)]
        exports: Vec<PathBuf>,

        /// Post type to convert (post, page, ...)
        #[arg(long, default_value = "post")]
        post_type: String,

        /// Hero image used when a post has no usable image
        #[arg(long, default_value = "./hero.png")]
        default_hero: String,

        /// Keep remote image references instead of downloading
        #[arg(long)]
        skip_images: bool,
    },

    /// List the convertible posts in an export file
    List {
        /// WXR export file path
        export: PathBuf,

        /// Post type to list
        #[arg(long, default_value = "post")]
        post_type: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            exports,
            post_type,
            default_hero,
            skip_images,
        } => {
            let options = BatchOptions::new()
                .with_post_type(post_type)
                .with_default_hero(default_hero)
                .with_skip_images(skip_images);
            let fetcher = HttpFetcher::new()?;

            let mut failed_total = 0usize;
            for export in &exports {
                let summary = batch::process_export_file(export, &fetcher, &options)?;
                let status = format!(
                    "{} converted, {} failed",
                    summary.converted, summary.failed
                );
                println!(
                    "{} {} -> {} ({})",
                    "✓".green().bold(),
                    export.display(),
                    summary.out_dir.display(),
                    if summary.failed == 0 {
                        status.green()
                    } else {
                        status.yellow()
                    }
                );
                failed_total += summary.failed;
            }

            if failed_total > 0 {
                return Err(format!("{failed_total} post(s) failed to convert").into());
            }
            Ok(())
        }

        Commands::List {
            export,
            post_type,
            json,
        } => {
            let xml = std::fs::read_to_string(&export)?;
            let posts = unwp::export::posts_of_type(unwp::parse_export(&xml)?, &post_type);

            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                println!(
                    "{} {} item(s) of type '{}' in {}",
                    "→".cyan().bold(),
                    posts.len(),
                    post_type,
                    export.display()
                );
                for post in &posts {
                    let date = post
                        .post_date
                        .as_deref()
                        .or(post.pub_date.as_deref())
                        .unwrap_or("no date");
                    println!("  {} {} ({})", "-".dimmed(), post.title.bold(), date);
                }
            }
            Ok(())
        }
    }
}
