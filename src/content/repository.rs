use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use spdlog::{error, warn};

use crate::content::{MetaRecord, PostMeta};
use crate::language::Language;
use crate::tags::TagsIndex;

const META_DIR: &str = "meta";
const INDEXES_DIR: &str = "indexes";
const PROCESSED_DIR: &str = "processed";
const RAW_DIR: &str = "raw";

/// Read access to the pre-rendered content.
///
/// Lookups never fail: a missing or broken resource is logged by the
/// implementation and reported as absent or empty.
pub trait ContentRepository {
    fn get_meta(&self, slug: &str) -> Option<MetaRecord>;

    /// Every readable record, in slug order.
    fn list_meta(&self) -> Vec<MetaRecord>;

    fn get_tag_index(&self, lang: Language) -> TagsIndex;

    /// The body written for exactly this language, without fallback.
    fn get_body(&self, slug: &str, lang: Language) -> Option<String>;

    fn has_body(&self, slug: &str, lang: Language) -> bool {
        self.get_body(slug, lang).is_some()
    }
}

/// Content laid out as
///
/// ```text
/// <root>/meta/<slug>.json
/// <root>/indexes/tags.json, tags.en.json
/// <root>/processed/<slug>.html, <slug>.en.html
/// <root>/raw/<name>.md
/// ```
#[derive(Debug, Clone)]
pub struct DirRepository {
    root_dir: PathBuf,
}

impl DirRepository {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        DirRepository {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root_dir.join(META_DIR)
    }

    pub fn indexes_dir(&self) -> PathBuf {
        self.root_dir.join(INDEXES_DIR)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root_dir.join(PROCESSED_DIR)
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root_dir.join(RAW_DIR)
    }

    fn meta_path(&self, slug: &str) -> PathBuf {
        self.meta_dir().join(format!("{}.json", slug))
    }

    /// Slugs of every `*.json` file in the meta directory, sorted.
    /// A missing directory is created and yields nothing.
    pub fn list_slugs(&self) -> io::Result<Vec<String>> {
        let meta_dir = self.meta_dir();
        if !meta_dir.exists() {
            warn!("Meta directory {} does not exist. Creating it", meta_dir.display());
            fs::create_dir_all(&meta_dir)?;
            return Ok(vec![]);
        }

        let mut slugs = vec![];
        for entry in fs::read_dir(&meta_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slugs.push(stem.to_string());
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    fn read_meta(&self, slug: &str) -> Result<Option<MetaRecord>> {
        let path = self.meta_path(slug);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Error reading {}", path.display())),
        };
        let mut meta: PostMeta = serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing {}", path.display()))?;

        // The file name is what links, indexes and bodies are keyed by
        if meta.slug != slug {
            if !meta.slug.is_empty() {
                warn!("Slug {} in {} does not match its file name. Using {}", meta.slug, path.display(), slug);
            }
            meta.slug = slug.to_string();
        }

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .ok();

        Ok(Some(MetaRecord { meta, modified }))
    }

    fn read_tag_index(&self, lang: Language) -> Result<TagsIndex> {
        let indexes_dir = self.indexes_dir();
        if !indexes_dir.exists() {
            warn!("Index directory {} does not exist. Creating it", indexes_dir.display());
            fs::create_dir_all(&indexes_dir)
                .with_context(|| format!("Error creating {}", indexes_dir.display()))?;
            return Ok(TagsIndex::new());
        }

        let path = indexes_dir.join(lang.tag_index_file());
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TagsIndex::new()),
            Err(e) => return Err(e).with_context(|| format!("Error reading {}", path.display())),
        };
        let index = serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing {}", path.display()))?;
        Ok(index)
    }

    /// Replaces the tag index of `lang` as a whole
    pub fn write_tag_index(&self, lang: Language, index: &TagsIndex) -> Result<PathBuf> {
        let indexes_dir = self.indexes_dir();
        fs::create_dir_all(&indexes_dir)
            .with_context(|| format!("Error creating {}", indexes_dir.display()))?;

        let path = indexes_dir.join(lang.tag_index_file());
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(index)?;
        fs::write(&tmp_path, json)
            .with_context(|| format!("Error writing {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Error replacing {}", path.display()))?;
        Ok(path)
    }
}

impl ContentRepository for DirRepository {
    fn get_meta(&self, slug: &str) -> Option<MetaRecord> {
        if slug.is_empty() || slug.contains('/') || slug.contains("..") {
            return None;
        }
        match self.read_meta(slug) {
            Ok(record) => record,
            Err(e) => {
                error!("Error reading post meta for {}: {:#}", slug, e);
                None
            }
        }
    }

    fn list_meta(&self) -> Vec<MetaRecord> {
        let slugs = match self.list_slugs() {
            Ok(slugs) => slugs,
            Err(e) => {
                error!("Error listing post meta in {}: {}", self.meta_dir().display(), e);
                return vec![];
            }
        };

        slugs.iter()
            .filter_map(|slug| self.get_meta(slug))
            .collect()
    }

    fn get_tag_index(&self, lang: Language) -> TagsIndex {
        match self.read_tag_index(lang) {
            Ok(index) => index,
            Err(e) => {
                error!("Error reading {} tag index: {:#}", lang, e);
                TagsIndex::new()
            }
        }
    }

    fn get_body(&self, slug: &str, lang: Language) -> Option<String> {
        if slug.is_empty() || slug.contains('/') || slug.contains("..") {
            return None;
        }
        let path = self.processed_dir().join(lang.body_file(slug));
        match fs::read_to_string(&path) {
            Ok(body) => Some(body),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                error!("Error reading post content {}: {}", path.display(), e);
                None
            }
        }
    }

    fn has_body(&self, slug: &str, lang: Language) -> bool {
        if slug.is_empty() || slug.contains('/') || slug.contains("..") {
            return false;
        }
        self.processed_dir().join(lang.body_file(slug)).is_file()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tempfile::TempDir;

    use crate::test_data::{BODY_EN, BODY_ZH, META_BILINGUAL, META_ZH_ONLY};

    use super::*;

    pub(crate) fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub(crate) fn sample_repo() -> (TempDir, DirRepository) {
        let dir = TempDir::new().unwrap();
        let repo = DirRepository::new(dir.path());
        write_file(&repo.meta_dir().join("vibe-coding.json"), META_BILINGUAL);
        write_file(&repo.meta_dir().join("installing-mcp-servers.json"), META_ZH_ONLY);
        write_file(&repo.processed_dir().join("installing-mcp-servers.html"), BODY_ZH);
        write_file(&repo.processed_dir().join("vibe-coding.html"), BODY_ZH);
        write_file(&repo.processed_dir().join("vibe-coding.en.html"), BODY_EN);
        (dir, repo)
    }

    #[test]
    fn test_get_meta() {
        let (_dir, repo) = sample_repo();
        let record = repo.get_meta("vibe-coding").unwrap();
        assert_eq!(record.meta.slug, "vibe-coding");
        assert!(record.modified.is_some());

        assert!(repo.get_meta("missing").is_none());
        assert!(repo.get_meta("../etc/passwd").is_none());
    }

    #[test]
    fn test_slug_comes_from_file_name() {
        let (_dir, repo) = sample_repo();
        write_file(&repo.meta_dir().join("renamed.json"), META_ZH_ONLY);
        let record = repo.get_meta("renamed").unwrap();
        assert_eq!(record.meta.slug, "renamed");
    }

    #[test]
    fn test_malformed_meta_is_skipped() {
        let (_dir, repo) = sample_repo();
        write_file(&repo.meta_dir().join("broken.json"), "{ not json");
        write_file(&repo.meta_dir().join("notes.txt"), "ignored");

        assert!(repo.get_meta("broken").is_none());
        let slugs: Vec<_> = repo.list_meta().into_iter().map(|r| r.meta.slug).collect();
        assert_eq!(slugs, vec!["installing-mcp-servers", "vibe-coding"]);
    }

    #[test]
    fn test_null_and_missing_fields_are_kept() {
        let (_dir, repo) = sample_repo();
        write_file(&repo.meta_dir().join("a.json"),
                   r#"{"slug": "a", "title": "A", "date": "2025-01-01", "tags": null, "tagsEn": null}"#);
        write_file(&repo.meta_dir().join("b.json"), r#"{"slug": "b", "title": "B", "tags": ["x"]}"#);

        let a = repo.get_meta("a").unwrap();
        assert!(a.meta.tags.is_empty());
        assert_eq!(a.meta.tags_en, None);
        let b = repo.get_meta("b").unwrap();
        assert_eq!(b.meta.date, "");
        assert_eq!(repo.list_meta().len(), 4);
    }

    #[test]
    fn test_missing_meta_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let repo = DirRepository::new(dir.path());
        assert!(repo.list_meta().is_empty());
        assert!(repo.meta_dir().is_dir());
    }

    #[test]
    fn test_get_body_is_exact() {
        let (_dir, repo) = sample_repo();
        assert_eq!(repo.get_body("vibe-coding", Language::En).as_deref(), Some(BODY_EN));
        assert_eq!(repo.get_body("installing-mcp-servers", Language::En), None);
        assert!(repo.has_body("vibe-coding", Language::En));
        assert!(!repo.has_body("installing-mcp-servers", Language::En));
    }

    #[test]
    fn test_tag_index_read_write() {
        let (_dir, repo) = sample_repo();
        assert!(repo.get_tag_index(Language::Zh).is_empty());
        assert!(repo.indexes_dir().is_dir());

        let mut index = TagsIndex::new();
        index.insert("工具".to_string(), vec!["a".to_string(), "b".to_string()]);
        let path = repo.write_tag_index(Language::Zh, &index).unwrap();
        assert!(path.ends_with("tags.json"));
        assert_eq!(repo.get_tag_index(Language::Zh), index);
        assert!(repo.get_tag_index(Language::En).is_empty());

        write_file(&repo.indexes_dir().join("tags.en.json"), "[1, 2");
        assert!(repo.get_tag_index(Language::En).is_empty());
    }
}
