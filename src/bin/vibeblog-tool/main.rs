use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vibeblog::content::repository::DirRepository;
use vibeblog::content::resolver::ContentResolver;
use vibeblog::html_generator::generate_html;
use vibeblog::sitemap::Sitemap;
use vibeblog::tags::index_builder::{generate_tag_indexes, BuildOutcome};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuilds tags.json and tags.en.json from the post metadata
    Tags(ContentArgs),
    /// Renders raw markdown into the processed HTML bodies
    Html(ContentArgs),
    /// Writes sitemap.xml
    Sitemap(SitemapArgs),
}

#[derive(Parser, Debug)]
struct ContentArgs {
    /// Directory holding meta/, indexes/, processed/ and raw/
    #[arg(short, long, default_value = "content")]
    content_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct SitemapArgs {
    #[arg(short, long, default_value = "content")]
    content_dir: PathBuf,

    /// Absolute site URL, e.g. https://vibeblog.app
    #[arg(short, long)]
    site_url: String,

    /// Where to write the sitemap
    #[arg(short, long, default_value = "public/sitemap.xml")]
    output: PathBuf,
}

fn tags_cmd(args: ContentArgs) -> Result<()> {
    let repo = DirRepository::new(args.content_dir);
    match generate_tag_indexes(&repo)? {
        BuildOutcome::MissingMetaDir => println!("Created empty {}. Nothing to index", repo.meta_dir().display()),
        BuildOutcome::NoRecords => println!("No post metadata found in {}", repo.meta_dir().display()),
        BuildOutcome::Written(report) => println!(
            "Indexed {} posts: {} zh tags, {} en tags",
            report.post_count, report.zh_tag_count, report.en_tag_count),
    }
    Ok(())
}

fn html_cmd(args: ContentArgs) -> Result<()> {
    let repo = DirRepository::new(args.content_dir);
    let count = generate_html(&repo.raw_dir(), &repo.processed_dir())?;
    println!("Generated {} HTML files in {}", count, repo.processed_dir().display());
    Ok(())
}

fn sitemap_cmd(args: SitemapArgs) -> Result<()> {
    let resolver = ContentResolver::new(DirRepository::new(args.content_dir));
    let sitemap = Sitemap::build(&resolver, &args.site_url);
    let xml = sitemap.render().context("Error rendering sitemap")?;

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Error creating {}", parent.display()))?;
    }
    fs::write(&args.output, xml)
        .with_context(|| format!("Error writing {}", args.output.display()))?;

    println!("Sitemap with {} urls written to {}", sitemap.urls.len(), args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Tags(args) => tags_cmd(args),
        Command::Html(args) => html_cmd(args),
        Command::Sitemap(args) => sitemap_cmd(args),
    }
}
