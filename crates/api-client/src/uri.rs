//! URI template parsing
//!
//! A descriptor URI such as `/users/{id}/posts?sort=desc&page={page}` is split
//! on the first `?`. The path half is kept verbatim for later substitution and
//! the query half is read as an ordinary query string whose literal pairs
//! become defaults. Placeholder names are collected from both halves.
//!
//! Braces that do not form a `{name}` token are left alone as literal text.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Parsed form of the URI half of an endpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriSchema {
    path_template: String,
    path_params: Vec<String>,
    query_defaults: Vec<(String, String)>,
    query_params: Vec<String>,
}

impl UriSchema {
    /// Parse a `path?query` template
    #[must_use]
    pub fn parse(uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        Self {
            path_template: path.to_string(),
            path_params: placeholders(path),
            query_defaults: query.map(parse_query).unwrap_or_default(),
            query_params: query.map(placeholders).unwrap_or_default(),
        }
    }

    /// Path half of the template, placeholders included
    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// Placeholder names used in the path, in order of first appearance
    #[must_use]
    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// Literal key/value pairs from the query half, in declaration order
    #[must_use]
    pub fn query_defaults(&self) -> &[(String, String)] {
        &self.query_defaults
    }

    /// Placeholder names used in the query half, in order of first appearance
    #[must_use]
    pub fn query_params(&self) -> &[String] {
        &self.query_params
    }

    /// Whether `name` is substituted into the path
    #[must_use]
    pub fn is_path_param(&self, name: &str) -> bool {
        self.path_params.iter().any(|p| p == name)
    }

    /// Default value declared in the query half for `key`
    #[must_use]
    pub fn query_default(&self, key: &str) -> Option<&str> {
        self.query_defaults
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Substitute every `{name}` in the path with `lookup(name)`
    ///
    /// Names the lookup does not know become the empty string.
    pub fn render_path(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        PLACEHOLDER
            .replace_all(&self.path_template, |caps: &Captures<'_>| {
                lookup(&caps[1]).unwrap_or_default()
            })
            .into_owned()
    }
}

fn placeholders(segment: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(segment) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for part in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        let key = decode(key);
        let value = decode(value);

        // Repeated keys keep their first position with the last value
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => pairs.push((key, value)),
        }
    }

    pairs
}

fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_only() {
        let schema = UriSchema::parse("/a/{x}/b/{y}");
        assert_eq!(schema.path_template(), "/a/{x}/b/{y}");
        assert_eq!(schema.path_params(), ["x", "y"]);
        assert!(schema.query_defaults().is_empty());
        assert!(schema.query_params().is_empty());
    }

    #[test]
    fn test_query_placeholders_and_defaults() {
        let schema = UriSchema::parse("/{p1}/{p2}?p3={p3}&p4={p4}&fixed=1");
        assert_eq!(schema.path_template(), "/{p1}/{p2}");
        assert_eq!(schema.path_params(), ["p1", "p2"]);
        assert_eq!(schema.query_params(), ["p3", "p4"]);
        assert_eq!(schema.query_default("p3"), Some("{p3}"));
        assert_eq!(schema.query_default("fixed"), Some("1"));
        assert_eq!(schema.query_defaults().len(), 3);
    }

    #[test]
    fn test_splits_on_first_question_mark() {
        let schema = UriSchema::parse("/search?q=a?b");
        assert_eq!(schema.path_template(), "/search");
        assert_eq!(schema.query_default("q"), Some("a?b"));
    }

    #[test]
    fn test_query_decoding() {
        let schema = UriSchema::parse("/x?name=hello%20world&flag&plus=a+b");
        assert_eq!(schema.query_default("name"), Some("hello world"));
        assert_eq!(schema.query_default("flag"), Some(""));
        assert_eq!(schema.query_default("plus"), Some("a b"));
    }

    #[test]
    fn test_malformed_braces_are_literal() {
        let schema = UriSchema::parse("/a/{unclosed/b");
        assert!(schema.path_params().is_empty());
        assert_eq!(schema.render_path(|_| None), "/a/{unclosed/b");

        let schema = UriSchema::parse("/a/}x{/{ok}");
        assert_eq!(schema.path_params(), ["ok"]);

        let schema = UriSchema::parse("/a/{x{y}");
        assert_eq!(schema.path_params(), ["y"]);
        assert_eq!(schema.render_path(|_| Some("1".into())), "/a/{x1");
    }

    #[test]
    fn test_duplicate_placeholders_listed_once() {
        let schema = UriSchema::parse("/{id}/copy/{id}");
        assert_eq!(schema.path_params(), ["id"]);
        assert_eq!(schema.render_path(|_| Some("7".into())), "/7/copy/7");
    }

    #[test]
    fn test_render_path_missing_is_empty() {
        let schema = UriSchema::parse("/users/{id}/posts");
        assert_eq!(schema.render_path(|_| None), "/users//posts");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let uri = "/test/{a}?b={b}&c=d";
        assert_eq!(UriSchema::parse(uri), UriSchema::parse(uri));
    }
}
