//! Tests for URL normalization.

use super::*;

#[test]
fn test_template_path_replaces_numeric_id() {
    assert_eq!(template_path("/users/42/profile"), "/users/:id/profile");
    assert_eq!(template_path("/users/abc"), "/users/abc");
}

#[test]
fn test_template_path_replaces_hex_and_uuid_segments() {
    assert_eq!(template_path("/blob/deadbeef"), "/blob/:id");
    assert_eq!(
        template_path("/orders/123e4567-e89b-12d3-a456-426614174000/items"),
        "/orders/:id/items"
    );
    // 7 hex characters is too short to be an identifier
    assert_eq!(template_path("/c/abcdef1"), "/c/abcdef1");
}

#[test]
fn test_template_path_digit_limit() {
    let nineteen = "1".repeat(19);
    let twenty = "1".repeat(20);
    assert_eq!(template_path(&format!("/n/{nineteen}")), "/n/:id");
    // 20 digits is still hex-shaped, so it is an identifier through the hex branch
    assert_eq!(template_path(&format!("/n/{twenty}")), "/n/:id");
    assert_eq!(template_path("/v/1a"), "/v/1a");
}

#[test]
fn test_template_path_preserves_empty_segments() {
    assert_eq!(template_path("/"), "/");
    assert_eq!(template_path(""), "/");
    assert_eq!(template_path("/a//b/"), "/a//b/");
    assert_eq!(template_path("//42//"), "//:id//");
}

#[test]
fn test_template_path_decodes_segments() {
    assert_eq!(template_path("/files/my%20doc"), "/files/my doc");
    assert_eq!(template_path("/x/%34%32"), "/x/:id");
}

#[test]
fn test_template_path_keeps_undecodable_segments_raw() {
    assert_eq!(template_path("/bad/%zz"), "/bad/%zz");
    assert_eq!(template_path("/bad/%FF"), "/bad/%FF");
    // decoding would introduce a slash, so the raw segment is kept
    assert_eq!(template_path("/a/1%2F2"), "/a/1%2F2");
}

#[test]
fn test_template_path_is_idempotent() {
    let samples = [
        "/users/42/profile",
        "/",
        "",
        "//a///b",
        "/files/my%20doc",
        "/x/%2541",
        "/a/1%2F2",
        "/bad/%zz",
        "/u/:id",
        "/deadbeef-dead-beef-dead-beefdeadbeef/x",
        "/caf%C3%A9/12",
    ];
    for path in samples {
        let once = template_path(path);
        assert_eq!(template_path(&once), once, "not idempotent for {path}");
    }
}

#[test]
fn test_placeholder_is_not_an_identifier() {
    assert!(!is_identifier_segment(ID_PLACEHOLDER));
}

#[test]
fn test_query_skeleton_order_and_duplicates() {
    assert_eq!(query_skeleton("b=1&a=2"), "?a=:param&b=:param");
    assert_eq!(
        query_skeleton("a=9&b=9&utm_source=x"),
        query_skeleton("b=1&a=2")
    );
    assert_eq!(query_skeleton("a=1&a=2&a"), "?a=:param");
}

#[test]
fn test_query_skeleton_strips_tracking_params() {
    assert_eq!(query_skeleton("utm_source=x&UTM_Medium=y"), "");
    assert_eq!(query_skeleton("gclid=1&fbclid=2&msclkid=3&q=4"), "?q=:param");
    // bare `utm_` has nothing after the prefix and is kept
    assert_eq!(query_skeleton("utm_=1"), "?utm_=:param");
}

#[test]
fn test_query_skeleton_empty_inputs() {
    assert_eq!(query_skeleton(""), "");
    assert_eq!(query_skeleton("?"), "");
    assert_eq!(query_skeleton("&&"), "");
}

#[test]
fn test_query_skeleton_accepts_leading_question_mark() {
    assert_eq!(query_skeleton("?page=2"), "?page=:param");
}

#[test]
fn test_record_key_format() {
    assert_eq!(
        record_key("get", "/users/:id", "?page=:param"),
        "GET /users/:id?page=:param"
    );
    assert_eq!(record_key("", "/", ""), "GET /");
}

#[test]
fn test_normalize_url_full() {
    let n = normalize_url("https://a.com/users/42?utm_source=x&page=2").expect("valid url");
    assert_eq!(n.origin, "https://a.com");
    assert_eq!(n.path_template, "/users/:id");
    assert_eq!(n.query_skeleton, "?page=:param");
}

#[test]
fn test_normalize_url_origin_keeps_non_default_port() {
    let n = normalize_url("http://localhost:8080/").expect("valid url");
    assert_eq!(n.origin, "http://localhost:8080");
    let n = normalize_url("https://a.com:443/x").expect("valid url");
    assert_eq!(n.origin, "https://a.com");
}

#[test]
fn test_normalize_url_rejects_malformed() {
    assert!(normalize_url("not a url").is_none());
    assert!(normalize_url("/relative/path").is_none());
    assert!(normalize_url("data:text/plain,hello").is_none());
    let long = format!("https://a.com/{}", "x".repeat(MAX_URL_LENGTH));
    assert!(normalize_url(&long).is_none());
}

#[test]
fn test_resolve_action_path() {
    assert_eq!(
        resolve_action_path("https://a.com/account/7/edit", "../9/save"),
        Some("/account/:id/save".to_string())
    );
    assert_eq!(
        resolve_action_path("https://a.com/login", ""),
        Some("/login".to_string())
    );
    assert_eq!(
        resolve_action_path("https://a.com/x", "https://b.com/api/55"),
        Some("/api/:id".to_string())
    );
    assert_eq!(resolve_action_path("nope", "/x"), None);
}

#[test]
fn test_template_regex() {
    assert_eq!(template_regex("/users/:id"), r"^/users/[^/]+$");
    assert_eq!(template_regex("/a.json"), r"^/a\.json$");
    let re = Regex::new(&template_regex("/users/:id/posts")).expect("valid regex");
    assert!(re.is_match("/users/42/posts"));
    assert!(!re.is_match("/users/42/x/posts"));
}
