use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::LocalizedPost;
use crate::language::Language;
use crate::view::{view_post, ViewLang, ViewPost};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    site_name: &'a str,
    #[ramhorns(flatten)]
    lang: ViewLang,
    has_tag: bool,
    tag: &'a str,
    post_count: usize,
    post_list: Vec<ViewPost>,
}

/// Post listings: the blog index and the tag pages
pub struct ListRenderer<'a> {
    pub template: Template<'a>,
    pub site_name: &'a str,
}

impl<'a> ListRenderer<'a> {
    pub fn new(list_tpl_src: &'a str, site_name: &'a str) -> io::Result<ListRenderer<'a>> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
            site_name,
        })
    }

    /// `path` is the page path without language prefix, e.g. `/blog`
    pub fn render(&self, lang: Language, path: &str, tag: Option<&str>, posts: &[LocalizedPost]) -> String {
        let post_list: Vec<_> = posts.iter().map(view_post).collect();

        self.template.render(&ListPage {
            site_name: self.site_name,
            lang: ViewLang::new(lang, path),
            has_tag: tag.is_some(),
            tag: tag.unwrap_or_default(),
            post_count: post_list.len(),
            post_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, lang: Language) -> LocalizedPost {
        LocalizedPost {
            slug: slug.to_string(),
            lang,
            title: format!("<{}>", slug),
            date: "2025-06-15".to_string(),
            tags: vec!["AI Development".to_string()],
            summary: "summary".to_string(),
            description: String::new(),
            hero_image: None,
            modified: None,
        }
    }

    #[test]
    fn render_list() {
        let template_src = "{{#has_tag}}TAG=[{{tag}}] {{/has_tag}}LANG=[{{lang}}] ALT=[{{alternate_link}}] COUNT=[{{post_count}}] {{#post_list}}({{link}}|{{title}}|{{date}}|{{#tags}}{{link}}{{/tags}}){{/post_list}}";
        let renderer = ListRenderer::new(template_src, "VibeBlog").unwrap();
        let posts = vec![post("a", Language::En), post("b", Language::En)];

        let res = renderer.render(Language::En, "/tags/AI%20Development", Some("AI Development"), &posts);
        assert_eq!(res, "TAG=[AI Development] LANG=[en] ALT=[/tags/AI%20Development] COUNT=[2] \
(/en/blog/a|&lt;a&gt;|2025-06-15|/en/tags/AI%20Development)\
(/en/blog/b|&lt;b&gt;|2025-06-15|/en/tags/AI%20Development)");

        let res = renderer.render(Language::Zh, "/blog", None, &[]);
        assert_eq!(res, "LANG=[zh] ALT=[/en/blog] COUNT=[0] ");
    }
}
