use std::collections::HashMap;

use crate::language::Language;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let buf = buf.strip_prefix('?').unwrap_or(buf);
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(|v| v.as_str())
    }

    /// Only `en` and `zh` are accepted, anything else is ignored
    pub fn get_lang(&self) -> Option<Language> {
        self.get("lang").and_then(Language::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_lang() {
        assert_eq!(QueryString::from("lang=en").get_lang(), Some(Language::En));
        assert_eq!(QueryString::from("?lang=zh").get_lang(), Some(Language::Zh));
        assert_eq!(QueryString::from("page=2&lang=en").get_lang(), Some(Language::En));
        assert_eq!(QueryString::from("lang=fr").get_lang(), None);
        assert_eq!(QueryString::from("lang=EN").get_lang(), None);
        assert_eq!(QueryString::from("").get_lang(), None);
    }

    #[test]
    fn test_parse_query_str() {
        let buf = "bread=baguette&cheese=comt%C3%A9&meat=ham&fat=butter";
        let meal = vec![
            ("bread".to_owned(), "baguette".to_owned()),
            ("cheese".to_owned(), "comté".to_owned()),
            ("meat".to_owned(), "ham".to_owned()),
            ("fat".to_owned(), "butter".to_owned()),
        ].into_iter().collect::<HashMap<_, _>>();

        let expected = QueryString {
            items: meal,
        };

        assert_eq!(QueryString::from(buf), expected);
    }

    #[test]
    fn test_parse_invalid_query_str() {
        let buf = "";
        let expected = QueryString {
            items: Default::default(),
        };
        assert_eq!(QueryString::from(buf), expected);
    }

    #[test]
    fn test_parse_key_only_query_str() {
        let buf = "key-only";
        let qs = QueryString::from(buf);
        assert_eq!(qs.get("key-only"), Some(""));
        assert_eq!(qs.get_lang(), None);
    }
}
