use std::collections::BTreeSet;
use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::repository::ContentRepository;
use crate::content::resolver::ContentResolver;
use crate::language::Language;
use crate::text_utils::last_modified_day;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">
  <url>
    <loc>https://vibeblog.app/blog/vibe-coding</loc>
    <lastmod>2025-06-15</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.7</priority>
    <xhtml:link rel="alternate" hreflang="zh-TW" href="https://vibeblog.app/blog/vibe-coding"/>
    <xhtml:link rel="alternate" hreflang="en-US" href="https://vibeblog.app/en/blog/vibe-coding"/>
  </url>
</urlset>
*/

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: &'static str,
    pub priority: &'static str,
    /// (hreflang, href)
    pub alternates: Vec<(&'static str, String)>,
}

pub struct Sitemap {
    pub urls: Vec<UrlEntry>,
}

fn base_url(site_url: &str) -> &str {
    site_url.trim_end_matches('/')
}

/// Fixed pages present in both languages
fn section_entries(site_url: &str, path: &str, changefreq: &'static str, priority: &'static str) -> Vec<UrlEntry> {
    let alternates: Vec<_> = Language::ALL.iter()
        .map(|lang| (lang.hreflang(), format!("{}{}", site_url, lang.path(path))))
        .collect();

    Language::ALL.iter()
        .map(|lang| UrlEntry {
            loc: format!("{}{}", site_url, lang.path(path)),
            lastmod: None,
            changefreq,
            priority,
            alternates: alternates.clone(),
        })
        .collect()
}

impl Sitemap {
    /// Enumerates every page of the site in one pass.
    pub fn build<R: ContentRepository>(resolver: &ContentResolver<R>, site_url: &str) -> Sitemap {
        let site_url = base_url(site_url);
        let mut urls = vec![];

        urls.extend(section_entries(site_url, "/", "daily", "1.0"));
        urls.extend(section_entries(site_url, "/blog", "daily", "0.9"));
        urls.extend(section_entries(site_url, "/tags", "weekly", "0.8"));

        let repo = resolver.repository();
        for post in resolver.get_all_posts_meta(Language::Zh) {
            let lastmod = last_modified_day(post.modified.as_ref(), &post.date);
            let zh_url = format!("{}{}", site_url, Language::Zh.path(&format!("/blog/{}", post.slug)));
            let en_url = format!("{}{}", site_url, Language::En.path(&format!("/blog/{}", post.slug)));

            let has_en = repo.has_body(&post.slug, Language::En);
            let alternates = if has_en {
                vec![
                    (Language::Zh.hreflang(), zh_url.clone()),
                    (Language::En.hreflang(), en_url.clone()),
                ]
            } else {
                vec![]
            };

            urls.push(UrlEntry {
                loc: zh_url,
                lastmod: lastmod.clone(),
                changefreq: "monthly",
                priority: "0.7",
                alternates: alternates.clone(),
            });
            if has_en {
                urls.push(UrlEntry {
                    loc: en_url,
                    lastmod,
                    changefreq: "monthly",
                    priority: "0.7",
                    alternates,
                });
            }
        }

        let zh_tags: BTreeSet<String> = resolver.get_all_tags(Language::Zh).into_iter().collect();
        let en_tags: BTreeSet<String> = resolver.get_all_tags(Language::En).into_iter().collect();
        let tag_url = |lang: Language, tag: &str| {
            format!("{}{}", site_url, lang.path(&format!("/tags/{}", urlencoding::encode(tag))))
        };

        for (lang, tags, other_tags) in [(Language::Zh, &zh_tags, &en_tags), (Language::En, &en_tags, &zh_tags)] {
            for tag in tags.iter() {
                // Alternates only when the translated tag has its own page
                let alternates = match resolver.translate_tag(tag, lang, lang.other()) {
                    Some(translated) if other_tags.contains(&translated) => {
                        let mut links = vec![
                            (lang.hreflang(), tag_url(lang, tag.as_str())),
                            (lang.other().hreflang(), tag_url(lang.other(), translated.as_str())),
                        ];
                        links.sort_by_key(|(hreflang, _)| *hreflang != Language::Zh.hreflang());
                        links
                    }
                    _ => vec![],
                };

                urls.push(UrlEntry {
                    loc: tag_url(lang, tag.as_str()),
                    lastmod: None,
                    changefreq: "weekly",
                    priority: "0.6",
                    alternates,
                });
            }
        }

        Sitemap { urls }
    }

    pub fn render(&self) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        // <?xml version="1.0" encoding="UTF-8"?>
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        // <urlset xmlns="..." xmlns:xhtml="...">
        let mut urlset = BytesStart::new("urlset");
        urlset.push_attribute(("xmlns", SITEMAP_NS));
        urlset.push_attribute(("xmlns:xhtml", XHTML_NS));
        writer.write_event(Event::Start(urlset))?;

        for entry in self.urls.iter() {
            writer.write_event(Event::Start(BytesStart::new("url")))?;
            push_text(&mut writer, "loc", &entry.loc)?;
            if let Some(ref lastmod) = entry.lastmod {
                push_text(&mut writer, "lastmod", lastmod)?;
            }
            push_text(&mut writer, "changefreq", entry.changefreq)?;
            push_text(&mut writer, "priority", entry.priority)?;

            // <xhtml:link rel="alternate" hreflang="en-US" href="..."/>
            for (hreflang, href) in entry.alternates.iter() {
                let mut link = BytesStart::new("xhtml:link");
                link.push_attribute(("rel", "alternate"));
                link.push_attribute(("hreflang", *hreflang));
                link.push_attribute(("href", href.as_str()));
                writer.write_event(Event::Empty(link))?;
            }
            writer.write_event(Event::End(BytesEnd::new("url")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("urlset")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
