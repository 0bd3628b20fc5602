use std::collections::HashMap;
use std::sync::OnceLock;

use spdlog::{debug, warn};

use crate::content::LocalizedPost;
use crate::content::repository::ContentRepository;
use crate::language::Language;
use crate::tags::translation::TagTranslator;

/// Composes metadata, tag indexes and rendered bodies into what the pages
/// need. Every lookup degrades to an empty or absent result.
pub struct ContentResolver<R: ContentRepository> {
    repo: R,
    translations: OnceLock<TagTranslator>,
}

impl<R: ContentRepository> ContentResolver<R> {
    pub fn new(repo: R) -> Self {
        ContentResolver {
            repo,
            translations: OnceLock::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn get_post_meta(&self, slug: &str, lang: Language) -> Option<LocalizedPost> {
        self.repo.get_meta(slug).map(|record| record.localize(lang))
    }

    pub fn get_all_posts_meta(&self, lang: Language) -> Vec<LocalizedPost> {
        let mut posts: Vec<_> = self.repo.list_meta()
            .iter()
            .map(|record| record.localize(lang))
            .collect();
        posts.sort_by(LocalizedPost::listing_order);
        posts
    }

    pub fn latest_posts(&self, lang: Language, count: usize) -> Vec<LocalizedPost> {
        let mut posts = self.get_all_posts_meta(lang);
        posts.truncate(count);
        posts
    }

    /// Rendered HTML for `slug`. English falls back to the default body.
    pub fn get_post_content(&self, slug: &str, lang: Language) -> Option<String> {
        if lang == Language::En {
            if let Some(body) = self.repo.get_body(slug, Language::En) {
                return Some(body);
            }
            debug!("No English body for {}. Falling back to the default one", slug);
        }
        self.repo.get_body(slug, Language::Zh)
    }

    pub fn get_all_tags(&self, lang: Language) -> Vec<String> {
        // BTreeMap keys are already sorted
        self.repo.get_tag_index(lang).into_keys().collect()
    }

    pub fn has_tag(&self, tag: &str, lang: Language) -> bool {
        self.repo.get_tag_index(lang).contains_key(tag)
    }

    pub fn get_posts_by_tag(&self, tag: &str, lang: Language) -> Vec<LocalizedPost> {
        let index = self.repo.get_tag_index(lang);
        let Some(slugs) = index.get(tag) else {
            return vec![];
        };

        let mut posts: Vec<_> = slugs.iter()
            .filter_map(|slug| {
                let post = self.get_post_meta(slug, lang);
                if post.is_none() {
                    warn!("Tag {} ({}) lists {} but it has no metadata", tag, lang, slug);
                }
                post
            })
            .collect();
        posts.sort_by(LocalizedPost::listing_order);
        posts
    }

    /// Tags ordered by how many posts carry them, most used first. Ties
    /// keep alphabetical order.
    pub fn popular_tags(&self, lang: Language, limit: usize) -> Vec<String> {
        let posts = self.get_all_posts_meta(lang);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in posts.iter() {
            for tag in post.tags.iter() {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut tags = self.get_all_tags(lang);
        tags.sort_by(|a, b| {
            let ca = counts.get(a.as_str()).unwrap_or(&0);
            let cb = counts.get(b.as_str()).unwrap_or(&0);
            cb.cmp(ca)
        });
        tags.truncate(limit);
        tags
    }

    /// Translation pairs, built from the repository on first use and kept
    /// until `reset_translations`.
    pub fn translations(&self) -> &TagTranslator {
        self.translations.get_or_init(|| {
            let records = self.repo.list_meta();
            let translator = TagTranslator::from_records(records.iter().map(|r| &r.meta));
            debug!("Tag translations built: {} pairs", translator.len());
            translator
        })
    }

    pub fn translate_tag(&self, tag: &str, from: Language, to: Language) -> Option<String> {
        self.translations().translate(tag, from, to)
    }

    /// Drops the translation cache so the next lookup sees current metadata
    pub fn reset_translations(&mut self) {
        self.translations.take();
    }
}
