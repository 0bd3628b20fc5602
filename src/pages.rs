use std::io;
use std::path::Path;

use spdlog::{debug, info};

use crate::content::repository::ContentRepository;
use crate::content::resolver::ContentResolver;
use crate::language::Language;
use crate::view::index_renderer::{IndexRenderer, TagListRenderer};
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::tag_link;

pub const INDEX_TPL: &str = "index.tpl";
pub const LIST_TPL: &str = "list.tpl";
pub const POST_TPL: &str = "post.tpl";
pub const TAGS_TPL: &str = "tags.tpl";

/// Shown under the featured post
const HOME_RECENT_POSTS: usize = 3;
const HOME_POPULAR_TAGS: usize = 6;

#[derive(Debug, PartialEq)]
pub enum PageOutcome {
    Html(String),
    NotFound,
    /// Location of the page to go to instead
    Redirect(String),
}

pub fn read_template(tpl_dir: &Path, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    std::fs::read_to_string(full_path)
}

pub fn render_home<R: ContentRepository>(resolver: &ContentResolver<R>, tpl_dir: &Path, site_name: &str,
                                         lang: Language) -> io::Result<PageOutcome> {
    let tpl_src = read_template(tpl_dir, INDEX_TPL)?;
    let renderer = IndexRenderer::new(&tpl_src, site_name)?;

    let recent = resolver.latest_posts(lang, HOME_RECENT_POSTS + 1);
    let tags = resolver.popular_tags(lang, HOME_POPULAR_TAGS);
    Ok(PageOutcome::Html(renderer.render(lang, &recent, &tags)))
}

pub fn render_blog<R: ContentRepository>(resolver: &ContentResolver<R>, tpl_dir: &Path, site_name: &str,
                                         lang: Language) -> io::Result<PageOutcome> {
    let tpl_src = read_template(tpl_dir, LIST_TPL)?;
    let renderer = ListRenderer::new(&tpl_src, site_name)?;

    let posts = resolver.get_all_posts_meta(lang);
    Ok(PageOutcome::Html(renderer.render(lang, "/blog", None, &posts)))
}

pub fn render_post<R: ContentRepository>(resolver: &ContentResolver<R>, tpl_dir: &Path, site_name: &str,
                                         slug: &str, lang: Language) -> io::Result<PageOutcome> {
    let Some(post) = resolver.get_post_meta(slug, lang) else {
        debug!("No metadata for post {}", slug);
        return Ok(PageOutcome::NotFound);
    };
    let Some(body) = resolver.get_post_content(slug, lang) else {
        debug!("No rendered body for post {}", slug);
        return Ok(PageOutcome::NotFound);
    };

    let tpl_src = read_template(tpl_dir, POST_TPL)?;
    let renderer = PostRenderer::new(&tpl_src, site_name)?;
    Ok(PageOutcome::Html(renderer.render(&post, &body)))
}

pub fn render_tag_list<R: ContentRepository>(resolver: &ContentResolver<R>, tpl_dir: &Path, site_name: &str,
                                             lang: Language) -> io::Result<PageOutcome> {
    let tpl_src = read_template(tpl_dir, TAGS_TPL)?;
    let renderer = TagListRenderer::new(&tpl_src, site_name)?;

    let tags = resolver.get_all_tags(lang);
    Ok(PageOutcome::Html(renderer.render(lang, &tags)))
}

/// A tag from the other language (e.g. `/en/tags/工具`) redirects to its
/// translation when this language's index knows it.
pub fn render_tag<R: ContentRepository>(resolver: &ContentResolver<R>, tpl_dir: &Path, site_name: &str,
                                        tag: &str, lang: Language) -> io::Result<PageOutcome> {
    if !resolver.has_tag(tag, lang) {
        return Ok(match resolver.translate_tag(tag, lang.other(), lang) {
            Some(translated) if resolver.has_tag(&translated, lang) => {
                info!("Tag {} redirected to {} ({})", tag, translated, lang);
                PageOutcome::Redirect(tag_link(lang, &translated))
            }
            _ => PageOutcome::NotFound,
        });
    }

    let posts = resolver.get_posts_by_tag(tag, lang);
    if posts.is_empty() {
        return Ok(PageOutcome::NotFound);
    }

    let tpl_src = read_template(tpl_dir, LIST_TPL)?;
    let renderer = ListRenderer::new(&tpl_src, site_name)?;
    let path = format!("/tags/{}", urlencoding::encode(tag));
    Ok(PageOutcome::Html(renderer.render(lang, &path, Some(tag), &posts)))
}
