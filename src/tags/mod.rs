use std::collections::BTreeMap;

pub mod index_builder;
pub mod translation;

/// Tag -> slugs carrying it, in the order the posts were scanned.
pub type TagsIndex = BTreeMap<String, Vec<String>>;
