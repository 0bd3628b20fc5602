use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::language::Language;
use crate::text_utils::parse_post_date;

pub mod repository;
pub mod resolver;

/// One metadata record, as written to `meta/<slug>.json` by the authoring step.
///
/// `tags` and `tags_en` are parallel: `tags_en[i]` is expected to be the
/// translation of `tags[i]`. Nothing checks this when the file is written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    /// Empty when the record has none; such posts list after dated ones
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_en: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_en: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

/// `null` reads the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A metadata record together with the modification time of its file.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaRecord {
    pub meta: PostMeta,
    pub modified: Option<DateTime<Utc>>,
}

/// A post as seen in one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedPost {
    pub slug: String,
    pub lang: Language,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    pub hero_image: Option<String>,
    pub modified: Option<DateTime<Utc>>,
}

impl LocalizedPost {
    pub fn published(&self) -> Option<NaiveDateTime> {
        parse_post_date(&self.date)
    }

    /// Composite listing order: newest date first, then most recently
    /// modified, then slug descending. Posts with an unparseable date go last.
    pub fn listing_order(a: &LocalizedPost, b: &LocalizedPost) -> Ordering {
        b.published().cmp(&a.published())
            .then_with(|| b.modified.cmp(&a.modified))
            .then_with(|| b.slug.cmp(&a.slug))
    }
}

fn text_or(translated: &Option<String>, default: &str) -> String {
    match translated {
        Some(text) if !text.is_empty() => text.clone(),
        _ => default.to_string(),
    }
}

/// Applies the per-field language fallback.
///
/// | field       | zh          | en                                           |
/// |-------------|-------------|----------------------------------------------|
/// | title       | title       | titleEn if non-empty, else title             |
/// | summary     | summary     | summaryEn if non-empty, else summary         |
/// | description | description | descriptionEn if non-empty, else description |
/// | tags        | tags        | tagsEn if present (even empty), else tags    |
///
/// Fields fall back independently, so an English record can mix languages.
pub fn localize(meta: &PostMeta, modified: Option<DateTime<Utc>>, lang: Language) -> LocalizedPost {
    let (title, summary, description, tags) = match lang {
        Language::Zh => (
            meta.title.clone(),
            meta.summary.clone(),
            meta.description.clone(),
            meta.tags.clone(),
        ),
        Language::En => (
            text_or(&meta.title_en, &meta.title),
            text_or(&meta.summary_en, &meta.summary),
            text_or(&meta.description_en, &meta.description),
            meta.tags_en.clone().unwrap_or_else(|| meta.tags.clone()),
        ),
    };

    LocalizedPost {
        slug: meta.slug.clone(),
        lang,
        title,
        date: meta.date.clone(),
        tags,
        summary,
        description,
        hero_image: meta.hero_image.clone(),
        modified,
    }
}

impl MetaRecord {
    pub fn localize(&self, lang: Language) -> LocalizedPost {
        localize(&self.meta, self.modified, lang)
    }
}
