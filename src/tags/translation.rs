use std::collections::HashMap;

use crate::content::PostMeta;
use crate::language::Language;

/// zh <-> en tag pairs inferred from metadata.
///
/// `tags[i]` is paired with `tags_en[i]` over the indexes both lists have.
/// The first pairing seen for a tag wins. A record whose lists were
/// reordered independently produces wrong pairs; that is a data entry
/// problem and is not detected here.
#[derive(Debug, Default)]
pub struct TagTranslator {
    zh_to_en: HashMap<String, String>,
    en_to_zh: HashMap<String, String>,
}

impl TagTranslator {
    pub fn from_records<'a>(records: impl IntoIterator<Item=&'a PostMeta>) -> Self {
        let mut translator = TagTranslator::default();
        for meta in records {
            let Some(ref tags_en) = meta.tags_en else {
                continue;
            };
            for (zh, en) in meta.tags.iter().zip(tags_en.iter()) {
                if zh.is_empty() || en.is_empty() {
                    continue;
                }
                translator.zh_to_en.entry(zh.clone()).or_insert_with(|| en.clone());
                translator.en_to_zh.entry(en.clone()).or_insert_with(|| zh.clone());
            }
        }
        translator
    }

    pub fn translate(&self, tag: &str, from: Language, to: Language) -> Option<String> {
        if from == to {
            return Some(tag.to_string());
        }
        let map = match from {
            Language::Zh => &self.zh_to_en,
            Language::En => &self.en_to_zh,
        };
        map.get(tag).cloned()
    }

    pub fn len(&self) -> usize {
        self.zh_to_en.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zh_to_en.is_empty()
    }
}
