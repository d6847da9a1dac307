//! URL normalization.
//!
//! Pure functions that map a raw request URL onto the canonical shape used as
//! the endpoint identity:
//! - [`template_path`] replaces identifier-like path segments with `:id`
//! - [`query_skeleton`] reduces a query string to its sorted, value-free key set
//! - [`record_key`] formats `METHOD pathTemplate querySkeleton`
//! - [`normalize_url`] applies all of the above to an absolute URL

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::{ID_PLACEHOLDER, MAX_URL_LENGTH, PARAM_PLACEHOLDER};

#[cfg(test)]
mod tests;

/// Purely numeric ids (1-19 digits) or hex strings of 8+ characters,
/// optionally hyphenated (UUID-shaped).
static ID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]{1,19}|[0-9a-fA-F]{8,}-?[0-9a-fA-F-]{0,27})$")
        .expect("identifier segment pattern is valid")
});

/// Tracking parameters that never contribute to a query skeleton.
static TRACKING_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:utm_.+|gclid|fbclid|msclkid)$").expect("tracking param pattern is valid")
});

/// Canonical identity of an observed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// `scheme://host[:port]`
    pub origin: String,
    /// Path with identifier-like segments replaced
    pub path_template: String,
    /// Sorted `?k=:param&...` shape, or empty
    pub query_skeleton: String,
}

/// Returns true if a (decoded) path segment looks like an identifier.
pub fn is_identifier_segment(segment: &str) -> bool {
    ID_SEGMENT.is_match(segment)
}

/// Returns true if a query key is a known tracking parameter.
pub fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAM.is_match(key)
}

/// Percent-decodes one path segment.
///
/// Falls back to the raw segment when decoding fails or when the decoded
/// text would contain `/` or `%`, so the result never changes shape when it is
/// templated again.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    match urlencoding::decode(segment) {
        Ok(decoded) if !decoded.contains(['/', '%']) => decoded,
        _ => Cow::Borrowed(segment),
    }
}

/// Maps a request path onto its template.
///
/// Empty segments (leading, trailing or doubled slashes) are kept so the slash
/// count is stable. The function is idempotent.
///
/// # Examples
///
/// ```
/// use endpoint_inventory::template_path;
///
/// assert_eq!(template_path("/users/42/profile"), "/users/:id/profile");
/// assert_eq!(template_path("/users/abc"), "/users/abc");
/// ```
pub fn template_path(path: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    path.split('/')
        .map(|segment| {
            if segment.is_empty() {
                return Cow::Borrowed("");
            }
            let decoded = decode_segment(segment);
            if is_identifier_segment(&decoded) {
                Cow::Borrowed(ID_PLACEHOLDER)
            } else {
                decoded
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Reduces a raw query string (without the leading `?`) to its key shape.
///
/// Values are ignored, tracking keys removed, remaining keys deduplicated and
/// sorted. Returns the empty string when no keys remain.
///
/// # Examples
///
/// ```
/// use endpoint_inventory::query_skeleton;
///
/// assert_eq!(query_skeleton("b=1&a=2"), "?a=:param&b=:param");
/// assert_eq!(query_skeleton("utm_source=x"), "");
/// ```
pub fn query_skeleton(raw_query: &str) -> String {
    let raw_query = raw_query.strip_prefix('?').unwrap_or(raw_query);
    if raw_query.is_empty() {
        return String::new();
    }

    let keys: BTreeSet<String> = url::form_urlencoded::parse(raw_query.as_bytes())
        .map(|(key, _)| key.into_owned())
        .filter(|key| !is_tracking_param(key))
        .collect();

    if keys.is_empty() {
        return String::new();
    }

    let rendered: Vec<String> = keys
        .iter()
        .map(|key| format!("{key}={PARAM_PLACEHOLDER}"))
        .collect();
    format!("?{}", rendered.join("&"))
}

/// Uppercases an HTTP method, defaulting to `GET` when empty.
pub fn normalize_method(method: &str) -> String {
    let trimmed = method.trim();
    if trimmed.is_empty() {
        "GET".to_string()
    } else {
        trimmed.to_uppercase()
    }
}

/// Formats the record key `METHOD pathTemplate querySkeleton`.
pub fn record_key(method: &str, path_template: &str, query_skeleton: &str) -> String {
    format!(
        "{} {}{}",
        normalize_method(method),
        path_template,
        query_skeleton
    )
}

/// Parses an absolute URL and normalizes it.
///
/// Returns `None` for anything that is not an absolute URL with a tuple origin
/// (e.g. relative references, `data:` URLs) or that exceeds the maximum URL
/// length.
pub fn normalize_url(raw: &str) -> Option<NormalizedUrl> {
    if raw.len() > MAX_URL_LENGTH {
        return None;
    }
    let parsed = Url::parse(raw).ok()?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(NormalizedUrl {
        origin: origin.ascii_serialization(),
        path_template: template_path(parsed.path()),
        query_skeleton: query_skeleton(parsed.query().unwrap_or("")),
    })
}

/// Resolves a form action against the page URL and templates its path.
///
/// Returns `None` when either URL cannot be parsed.
pub fn resolve_action_path(page_url: &str, action: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    let resolved = base.join(action).ok()?;
    Some(template_path(resolved.path()))
}

/// Builds an anchored regex matching concrete paths for a template.
///
/// # Examples
///
/// ```
/// use endpoint_inventory::normalize::template_regex;
///
/// assert_eq!(template_regex("/users/:id"), r"^/users/[^/]+$");
/// ```
pub fn template_regex(path_template: &str) -> String {
    let escaped = regex::escape(path_template);
    format!("^{}$", escaped.replace(ID_PLACEHOLDER, "[^/]+"))
}
