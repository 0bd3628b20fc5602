use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use spdlog::{info, warn};

use crate::content::PostMeta;
use crate::content::repository::{ContentRepository, DirRepository};
use crate::language::Language;
use crate::tags::TagsIndex;

#[derive(Debug, Default, PartialEq)]
pub struct TagIndexes {
    pub zh: TagsIndex,
    pub en: TagsIndex,
}

#[derive(Debug, PartialEq)]
pub struct TagIndexReport {
    pub zh_tag_count: usize,
    pub en_tag_count: usize,
    pub post_count: usize,
}

#[derive(Debug, PartialEq)]
pub enum BuildOutcome {
    /// The meta directory did not exist. It was created, nothing was written
    MissingMetaDir,
    /// No record could be read, nothing was written
    NoRecords,
    Written(TagIndexReport),
}

fn add_tags(index: &mut TagsIndex, tags: &[String], slug: &str) {
    for tag in tags {
        let slugs = index.entry(tag.clone()).or_default();
        if !slugs.iter().any(|s| s == slug) {
            slugs.push(slug.to_string());
        }
    }
}

/// Builds both language indexes. Chinese tags come from `tags`, English
/// ones from `tags_en` only, never from the fallback.
pub fn build_tag_indexes<'a>(records: impl IntoIterator<Item=&'a PostMeta>) -> TagIndexes {
    let mut indexes = TagIndexes::default();
    for meta in records {
        add_tags(&mut indexes.zh, &meta.tags, &meta.slug);
        if let Some(ref tags_en) = meta.tags_en {
            add_tags(&mut indexes.en, tags_en, &meta.slug);
        }
    }
    indexes
}

impl TagIndexes {
    pub fn report(&self) -> TagIndexReport {
        let post_count = self.zh.values()
            .chain(self.en.values())
            .flatten()
            .collect::<HashSet<_>>()
            .len();

        TagIndexReport {
            zh_tag_count: self.zh.len(),
            en_tag_count: self.en.len(),
            post_count,
        }
    }
}

/// Scans every metadata record of `repo` and rewrites `tags.json` and
/// `tags.en.json`. Broken records are logged and left out.
pub fn generate_tag_indexes(repo: &DirRepository) -> Result<BuildOutcome> {
    let meta_dir = repo.meta_dir();
    if !meta_dir.exists() {
        warn!("Meta directory does not exist: {}", meta_dir.display());
        fs::create_dir_all(&meta_dir)
            .with_context(|| format!("Error creating {}", meta_dir.display()))?;
        return Ok(BuildOutcome::MissingMetaDir);
    }

    info!("Scanning post metadata in {}", meta_dir.display());
    let records = repo.list_meta();
    if records.is_empty() {
        warn!("No metadata JSON files found in {}", meta_dir.display());
        return Ok(BuildOutcome::NoRecords);
    }

    let indexes = build_tag_indexes(records.iter().map(|r| &r.meta));
    let zh_path = repo.write_tag_index(Language::Zh, &indexes.zh)?;
    let en_path = repo.write_tag_index(Language::En, &indexes.en)?;

    let report = indexes.report();
    info!("Tag indexes generated: {} zh tags, {} en tags, {} posts",
        report.zh_tag_count, report.en_tag_count, report.post_count);
    info!("Written {}", zh_path.display());
    info!("Written {}", en_path.display());

    Ok(BuildOutcome::Written(report))
}
