use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::LocalizedPost;
use crate::language::Language;
use crate::view::{view_post, view_tags, ViewLang, ViewPost, ViewTag};

#[derive(ramhorns::Content)]
struct HomePage<'a> {
    site_name: &'a str,
    #[ramhorns(flatten)]
    lang: ViewLang,
    has_latest: bool,
    latest: Vec<ViewPost>,
    recent_posts: Vec<ViewPost>,
    popular_tags: Vec<ViewTag>,
}

#[derive(ramhorns::Content)]
struct TagListPage<'a> {
    site_name: &'a str,
    #[ramhorns(flatten)]
    lang: ViewLang,
    tag_count: usize,
    tag_list: Vec<ViewTag>,
}

/// Home page: the newest post, a few recent ones and the most used tags
pub struct IndexRenderer<'a> {
    pub template: Template<'a>,
    pub site_name: &'a str,
}

impl<'a> IndexRenderer<'a> {
    pub fn new(index_tpl_src: &'a str, site_name: &'a str) -> io::Result<IndexRenderer<'a>> {
        let template = match Template::new(index_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing index template: {}", e)));
            }
        };

        Ok(IndexRenderer {
            template,
            site_name,
        })
    }

    /// `recent` is expected newest first; its head becomes the featured post
    pub fn render(&self, lang: Language, recent: &[LocalizedPost], popular_tags: &[String]) -> String {
        let mut recent_posts: Vec<_> = recent.iter().map(view_post).collect();
        let latest: Vec<_> = if recent_posts.is_empty() {
            vec![]
        } else {
            vec![recent_posts.remove(0)]
        };

        self.template.render(&HomePage {
            site_name: self.site_name,
            lang: ViewLang::new(lang, "/"),
            has_latest: !latest.is_empty(),
            latest,
            recent_posts,
            popular_tags: view_tags(lang, popular_tags),
        })
    }
}

pub struct TagListRenderer<'a> {
    pub template: Template<'a>,
    pub site_name: &'a str,
}

impl<'a> TagListRenderer<'a> {
    pub fn new(tags_tpl_src: &'a str, site_name: &'a str) -> io::Result<TagListRenderer<'a>> {
        let template = match Template::new(tags_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing tag list template: {}", e)));
            }
        };

        Ok(TagListRenderer {
            template,
            site_name,
        })
    }

    pub fn render(&self, lang: Language, tags: &[String]) -> String {
        self.template.render(&TagListPage {
            site_name: self.site_name,
            lang: ViewLang::new(lang, "/tags"),
            tag_count: tags.len(),
            tag_list: view_tags(lang, tags),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, date: &str) -> LocalizedPost {
        LocalizedPost {
            slug: slug.to_string(),
            lang: Language::En,
            title: slug.to_uppercase(),
            date: date.to_string(),
            tags: vec![],
            summary: String::new(),
            description: String::new(),
            hero_image: None,
            modified: None,
        }
    }

    #[test]
    fn render_home() {
        let template_src = "{{site_name}} ALT=[{{alternate_link}}] \
{{#latest}}LATEST=[{{title}}|{{link}}] {{/latest}}\
RECENT=[{{#recent_posts}}({{title}}){{/recent_posts}}] \
TAGS=[{{#popular_tags}}({{tag}}|{{link}}){{/popular_tags}}]";
        let renderer = IndexRenderer::new(template_src, "VibeBlog").unwrap();
        let recent = vec![post("c", "2025-03-01"), post("b", "2025-02-01"), post("a", "2025-01-01")];
        let tags = vec!["Tools".to_string(), "AI Development".to_string()];

        let res = renderer.render(Language::En, &recent, &tags);
        assert_eq!(res, "VibeBlog ALT=[/] LATEST=[C|/en/blog/c] RECENT=[(B)(A)] \
TAGS=[(Tools|/en/tags/Tools)(AI Development|/en/tags/AI%20Development)]");
    }

    #[test]
    fn render_empty_home() {
        let template_src = "{{#has_latest}}HAS{{/has_latest}}{{^has_latest}}EMPTY{{/has_latest}} ALT=[{{alternate_link}}]";
        let renderer = IndexRenderer::new(template_src, "VibeBlog").unwrap();
        assert_eq!(renderer.render(Language::Zh, &[], &[]), "EMPTY ALT=[/en]");
    }

    #[test]
    fn render_tag_list() {
        let template_src = "COUNT=[{{tag_count}}] ALT=[{{alternate_link}}] {{#tag_list}}({{tag}}|{{link}}){{/tag_list}}";
        let renderer = TagListRenderer::new(template_src, "VibeBlog").unwrap();
        let tags = vec!["AI開發".to_string(), "工具".to_string()];

        let res = renderer.render(Language::Zh, &tags);
        assert_eq!(res, "COUNT=[2] ALT=[/en/tags] \
(AI開發|/tags/AI%E9%96%8B%E7%99%BC)(工具|/tags/%E5%B7%A5%E5%85%B7)");
    }
}
