//! Projection of call parameters onto path, query string and body
//!
//! Path placeholders always consume their parameter. Read verbs turn every
//! remaining parameter into the query string, while write verbs only surface
//! the placeholders declared in the query half of the descriptor and send the
//! remaining parameters as the body.

use crate::params::{render_value, Params};
use crate::template::RequestTemplate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters escaped in query keys and values (everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`)
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Materialized request parts for one call
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Path with placeholders substituted
    pub path: String,
    /// Encoded query string without the leading `?`
    pub query: String,
    /// Body payload candidates
    pub body: Params,
}

impl Projection {
    /// Path plus query, joined with `?` only when the query is non-empty
    #[must_use]
    pub fn path_and_query(&self) -> String {
        join_path_query(&self.path, &self.query)
    }
}

/// Project `params` onto every part of the request
#[must_use]
pub fn project(template: &RequestTemplate, params: &Params) -> Projection {
    Projection {
        path: render_path(template, params),
        query: render_query(template, params),
        body: project_body(template, params),
    }
}

/// Full request URL: base URL, substituted path and query string
#[must_use]
pub fn project_url(template: &RequestTemplate, params: &Params) -> String {
    format!(
        "{}{}",
        template.base_url(),
        join_path_query(&render_path(template, params), &render_query(template, params))
    )
}

/// Parameters minus path placeholders, restricted to the body allow-list
#[must_use]
pub fn project_body(template: &RequestTemplate, params: &Params) -> Params {
    let uri = template.uri();
    let remaining: Params = params
        .iter()
        .filter(|(key, _)| !uri.is_path_param(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    match template.body_pick() {
        Some(pick) => pick_keys(&remaining, pick),
        None => remaining,
    }
}

fn render_path(template: &RequestTemplate, params: &Params) -> String {
    template
        .uri()
        .render_path(|name| params.get(name).map(render_value))
}

fn render_query(template: &RequestTemplate, params: &Params) -> String {
    let pairs = if template.is_write() {
        write_query(template, params)
    } else {
        read_query(template, params)
    };

    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(&render_value(value), QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn read_query(template: &RequestTemplate, params: &Params) -> Params {
    let uri = template.uri();
    let mut query: Params = params
        .iter()
        .filter(|(key, _)| !uri.is_path_param(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, default) in uri.query_defaults() {
        if !uri.is_path_param(key) && !query.contains_key(key) {
            query.insert(key.clone(), Value::String(default.clone()));
        }
    }

    match template.query_pick() {
        Some(pick) => pick_keys(&query, pick),
        None => query,
    }
}

fn write_query(template: &RequestTemplate, params: &Params) -> Params {
    let uri = template.uri();
    let mut query: Params = uri
        .query_defaults()
        .iter()
        .filter(|(key, _)| !uri.is_path_param(key))
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    for name in uri.query_params() {
        if uri.is_path_param(name) {
            continue;
        }
        if let Some(value) = params.get(name) {
            query.insert(name.clone(), value.clone());
        }
    }

    query
}

fn pick_keys(source: &Params, pick: &[String]) -> Params {
    pick.iter()
        .filter_map(|key| source.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}

fn join_path_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use serde_json::json;

    fn template(descriptor: &str) -> RequestTemplate {
        RequestTemplate::build(descriptor, "m", &ClientOptions::new("http://example.com")).unwrap()
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    #[test]
    fn test_get_path_only() {
        let t = template("GET /a/{x}/b/{y}");
        let p = project(&t, &params(json!({"x": 1, "y": 2})));
        assert_eq!(p.path, "/a/1/b/2");
        assert_eq!(p.query, "");
        assert_eq!(p.path_and_query(), "/a/1/b/2");
    }

    #[test]
    fn test_get_extra_params_become_query() {
        let t = template("get /test1/{param1}/stuff/{param2}");
        let url = project_url(
            &t,
            &params(json!({"param1": 1, "param2": 2, "k": "v", "t": "b"})),
        );
        assert_eq!(url, "http://example.com/test1/1/stuff/2?k=v&t=b");
    }

    #[test]
    fn test_get_query_is_percent_encoded() {
        let t = template("GET /search");
        let p = project(&t, &params(json!({"q": "a b&c", "tag[]": "x/y", "ok": "-_.!~*'()"})));
        assert_eq!(p.query, "q=a%20b%26c&tag%5B%5D=x%2Fy&ok=-_.!~*'()");
    }

    #[test]
    fn test_get_defaults_do_not_override() {
        let t = template("GET /list?limit=10&sort=asc");
        let p = project(&t, &params(json!({"sort": "desc", "page": 2})));
        assert_eq!(p.query, "sort=desc&page=2&limit=10");
    }

    #[test]
    fn test_get_query_pick_order() {
        let options = ClientOptions::new("http://example.com").with_query_pick("m", ["b", "a", "z"]);
        let t = RequestTemplate::build("GET /x/{id}", "m", &options).unwrap();
        let p = project(&t, &params(json!({"id": 1, "a": 1, "b": 2, "c": 3})));
        assert_eq!(p.path, "/x/1");
        assert_eq!(p.query, "b=2&a=1");
    }

    #[test]
    fn test_post_params_become_body() {
        let t = template("post /test2/{param}");
        let p = project(&t, &params(json!({"param": "value", "a": 1, "b": 2})));
        assert_eq!(p.path_and_query(), "/test2/value");
        assert_eq!(Value::Object(p.body), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_post_body_pick() {
        let options = ClientOptions::new("http://example.com").with_body_pick("m", ["name"]);
        let t = RequestTemplate::build("POST /users", "m", &options).unwrap();
        let body = project_body(&t, &params(json!({"name": "n", "admin": true})));
        assert_eq!(Value::Object(body), json!({"name": "n"}));
    }

    #[test]
    fn test_post_query_placeholders_substituted() {
        let t = template("post /{p1}/{p2}?p3={p3}&p4={p4}");
        let url = project_url(&t, &params(json!({"p1": "a", "p2": "b", "p3": "c", "p4": "d"})));
        assert_eq!(url, "http://example.com/a/b?p3=c&p4=d");
    }

    #[test]
    fn test_post_absent_placeholders_keep_literal_text() {
        let t = template("post /{p1}/{p2}?p3={p3}&p4={p4}");
        let url = project_url(&t, &params(json!({"p1": "a", "p2": "b"})));
        assert_eq!(url, "http://example.com/a/b?p3=%7Bp3%7D&p4=%7Bp4%7D");
    }

    #[test]
    fn test_post_extra_params_not_in_query() {
        let t = template("PUT /items/{id}?version={version}");
        let p = project(&t, &params(json!({"id": 5, "version": 3, "name": "x"})));
        assert_eq!(p.path_and_query(), "/items/5?version=3");
        assert_eq!(Value::Object(p.body), json!({"version": 3, "name": "x"}));
    }

    #[test]
    fn test_path_param_excluded_from_query_and_body() {
        let t = template("POST /items/{id}?id={id}&mode=fast");
        let p = project(&t, &params(json!({"id": 9, "a": 1})));
        assert_eq!(p.path_and_query(), "/items/9?mode=fast");
        assert_eq!(Value::Object(p.body), json!({"a": 1}));

        let t = template("GET /items/{id}?id={id}");
        let p = project(&t, &params(json!({"id": 9})));
        assert_eq!(p.path_and_query(), "/items/9");
    }

    #[test]
    fn test_missing_path_param_is_empty() {
        let t = template("GET /users/{id}/posts");
        let p = project(&t, &Params::new());
        assert_eq!(p.path_and_query(), "/users//posts");
    }

    #[test]
    fn test_params_untouched() {
        let t = template("POST /x/{id}");
        let input = params(json!({"id": 1, "a": 2}));
        let before = input.clone();
        let _ = project(&t, &input);
        assert_eq!(input, before);
    }
}
