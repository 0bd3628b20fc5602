use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::LocalizedPost;
use crate::view::{view_post, ViewLang, ViewPost};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_name: &'a str,
    #[ramhorns(flatten)]
    lang: ViewLang,
    #[ramhorns(flatten)]
    post: ViewPost,
    description: &'a str,
    post_content: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
    pub site_name: &'a str,
}

impl<'a> PostRenderer<'a> {
    pub fn new(view_tpl_src: &'a str, site_name: &'a str) -> io::Result<PostRenderer<'a>> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
            site_name,
        })
    }

    pub fn render(&self, post: &LocalizedPost, body: &str) -> String {
        let path = format!("/blog/{}", post.slug);
        self.template.render(&ViewItem {
            site_name: self.site_name,
            lang: ViewLang::new(post.lang, &path),
            post: view_post(post),
            description: post.description.as_str(),
            post_content: body,
        })
    }
}
