use std::fmt;
use std::fmt::Formatter;

use crate::query_string::QueryString;

/// The two languages the blog is published in. Chinese is the default
/// whenever nothing in the request says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Zh, Language::En];

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "zh" => Some(Language::Zh),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn hreflang(&self) -> &'static str {
        match self {
            Language::Zh => "zh-TW",
            Language::En => "en-US",
        }
    }

    /// Path prefix used by the language-prefixed routes. Chinese lives at the root.
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Language::Zh => "",
            Language::En => "/en",
        }
    }

    pub fn other(&self) -> Language {
        match self {
            Language::Zh => Language::En,
            Language::En => Language::Zh,
        }
    }

    pub fn tag_index_file(&self) -> &'static str {
        match self {
            Language::Zh => "tags.json",
            Language::En => "tags.en.json",
        }
    }

    pub fn body_file(&self, slug: &str) -> String {
        match self {
            Language::Zh => format!("{}.html", slug),
            Language::En => format!("{}.en.html", slug),
        }
    }

    /// Builds a site path for this language, e.g. `/blog` -> `/en/blog`
    pub fn path(&self, path: &str) -> String {
        let prefix = self.path_prefix();
        if path.is_empty() || path == "/" {
            return if prefix.is_empty() { "/".to_string() } else { prefix.to_string() };
        }
        if path.starts_with('/') {
            format!("{}{}", prefix, path)
        } else {
            format!("{}/{}", prefix, path)
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Resolves the active language for a request.
///
/// `url` is the request path, optionally followed by `?query`. The most
/// specific source wins:
///   1. a `lang` route parameter equal to `en` or `zh`
///   2. a `/en` path prefix
///   3. a `lang=en|zh` query parameter
///   4. `zh`
///
/// Pre-rendering passes bare paths, so the query is parsed from the raw
/// string and a broken query is treated as absent.
pub fn parse_language(url: &str, route_param: Option<&str>) -> Language {
    if let Some(lang) = route_param.and_then(Language::from_code) {
        return lang;
    }

    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    if path == "/en" || path.starts_with("/en/") {
        return Language::En;
    }

    query
        .and_then(|q| QueryString::from(q).get_lang())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix_wins() {
        assert_eq!(parse_language("/en/blog/foo", None), Language::En);
        assert_eq!(parse_language("/en", None), Language::En);
        assert_eq!(parse_language("/en/", None), Language::En);
    }

    #[test]
    fn test_query_without_prefix() {
        assert_eq!(parse_language("/blog/foo?lang=en", None), Language::En);
        assert_eq!(parse_language("/blog/foo?lang=zh", None), Language::Zh);
        assert_eq!(parse_language("/blog/foo?lang=de", None), Language::Zh);
        assert_eq!(parse_language("/blog/foo?%%%", None), Language::Zh);
    }

    #[test]
    fn test_route_param_wins() {
        assert_eq!(parse_language("/en/blog/foo", Some("zh")), Language::Zh);
        assert_eq!(parse_language("/blog/foo?lang=zh", Some("en")), Language::En);
        // Unknown route values fall through to the path
        assert_eq!(parse_language("/en/blog/foo", Some("fr")), Language::En);
    }

    #[test]
    fn test_default_is_zh() {
        assert_eq!(parse_language("/blog/foo", None), Language::Zh);
        assert_eq!(parse_language("/", None), Language::Zh);
        assert_eq!(parse_language("", None), Language::Zh);
        assert_eq!(parse_language("/english/blog", None), Language::Zh);
    }

    #[test]
    fn test_lang_path() {
        assert_eq!(Language::Zh.path("/blog"), "/blog");
        assert_eq!(Language::En.path("/blog"), "/en/blog");
        assert_eq!(Language::En.path("tags"), "/en/tags");
        assert_eq!(Language::Zh.path("/"), "/");
        assert_eq!(Language::En.path("/"), "/en");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(Language::Zh.tag_index_file(), "tags.json");
        assert_eq!(Language::En.tag_index_file(), "tags.en.json");
        assert_eq!(Language::Zh.body_file("hello"), "hello.html");
        assert_eq!(Language::En.body_file("hello"), "hello.en.html");
    }
}
