use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use markdown::Options;
use regex::Regex;
use spdlog::{error, info, warn};

lazy_static! {
    // Leading h1/h2 headings followed by an image-only paragraph
    static ref HERO_AFTER_HEADINGS: Regex = Regex::new(
        r"(?i)^\s*((?:<h[12]>[^<]*</h[12]>\s*)+)<p>\s*<img[^>]*>\s*</p>\s*"
    ).unwrap();
    static ref HERO_AT_START: Regex = Regex::new(
        r"(?i)^\s*<p>\s*<img[^>]*>\s*</p>\s*"
    ).unwrap();
    static ref EXTERNAL_LINK: Regex = Regex::new(
        r#"<a href="(https?://[^"]+)""#
    ).unwrap();
}

/// The hero image is shown above the post, so the first image of the body
/// is dropped when it sits right after the title or opens the document.
pub fn remove_hero_image(html: &str) -> String {
    if HERO_AFTER_HEADINGS.is_match(html) {
        return HERO_AFTER_HEADINGS.replace(html, "$1").to_string();
    }
    HERO_AT_START.replace(html, "").to_string()
}

pub fn open_external_links_in_new_tab(html: &str) -> String {
    EXTERNAL_LINK
        .replace_all(html, r#"<a href="$1" target="_blank" rel="noopener noreferrer""#)
        .to_string()
}

pub fn render_markdown(md_text: &str) -> io::Result<String> {
    let html = match markdown::to_html_with_options(md_text, &Options::gfm()) {
        Ok(x) => x,
        Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput, e.to_string())),
    };
    let html = remove_hero_image(&html);
    Ok(open_external_links_in_new_tab(&html))
}

/// Renders `raw_dir/<name>.md` into `processed_dir/<name>.html`.
/// `post.en.md` becomes `post.en.html`, the English body of `post`.
/// Returns how many files were written; broken files are logged and skipped.
pub fn generate_html(raw_dir: &Path, processed_dir: &Path) -> Result<usize> {
    if !raw_dir.exists() {
        warn!("Raw content directory does not exist: {}", raw_dir.display());
        return Ok(0);
    }
    fs::create_dir_all(processed_dir)
        .with_context(|| format!("Error creating {}", processed_dir.display()))?;

    let mut files: Vec<_> = fs::read_dir(raw_dir)
        .with_context(|| format!("Error listing {}", raw_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    files.sort();
    info!("Found {} markdown files in {}", files.len(), raw_dir.display());

    let mut written = 0;
    for path in files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let output = processed_dir.join(format!("{}.html", stem));

        let result = fs::read_to_string(&path)
            .and_then(|md| render_markdown(&md))
            .and_then(|html| fs::write(&output, html));
        match result {
            Ok(()) => {
                info!("Generated {}", output.display());
                written += 1;
            }
            Err(e) => error!("Error rendering {}: {}", path.display(), e),
        }
    }

    Ok(written)
}
