use crate::content::LocalizedPost;
use crate::language::Language;
use crate::text_utils::format_day;

pub mod index_renderer;
pub mod list_renderer;
pub mod post_renderer;

#[derive(ramhorns::Content)]
pub(crate) struct ViewTag {
    tag: String,
    link: String,
}

#[derive(ramhorns::Content)]
pub(crate) struct ViewPost {
    slug: String,
    date: String,
    link: String,
    title: String,
    summary: String,
    has_hero: bool,
    hero_image: String,
    tags: Vec<ViewTag>,
}

/// Language bits every template gets
#[derive(ramhorns::Content)]
pub(crate) struct ViewLang {
    lang: &'static str,
    hreflang: &'static str,
    lang_prefix: &'static str,
    is_en: bool,
    /// Same page in the other language
    alternate_link: String,
}

impl ViewLang {
    pub(crate) fn new(lang: Language, path: &str) -> Self {
        ViewLang {
            lang: lang.code(),
            hreflang: lang.hreflang(),
            lang_prefix: lang.path_prefix(),
            is_en: lang == Language::En,
            alternate_link: lang.other().path(path),
        }
    }
}

pub fn tag_link(lang: Language, tag: &str) -> String {
    lang.path(&format!("/tags/{}", urlencoding::encode(tag)))
}

pub fn post_link(lang: Language, slug: &str) -> String {
    lang.path(&format!("/blog/{}", slug))
}

pub(crate) fn view_tags(lang: Language, tags: &[String]) -> Vec<ViewTag> {
    tags.iter()
        .map(|t| ViewTag {
            tag: t.clone(),
            link: tag_link(lang, t),
        })
        .collect()
}

pub(crate) fn view_post(post: &LocalizedPost) -> ViewPost {
    let date = match post.published() {
        Some(d) => format_day(&d),
        None => post.date.clone(),
    };
    ViewPost {
        slug: post.slug.clone(),
        date,
        link: post_link(post.lang, &post.slug),
        title: post.title.clone(),
        summary: post.summary.clone(),
        has_hero: post.hero_image.is_some(),
        hero_image: post.hero_image.clone().unwrap_or_default(),
        tags: view_tags(post.lang, &post.tags),
    }
}
