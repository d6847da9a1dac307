//! Static asset heuristic used by the `hide_assets` export filter.

use crate::models::EndpointRecord;

const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "map", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "avif",
    "woff", "woff2", "ttf", "otf", "eot", "mp4", "webm", "mov", "avi", "mp3", "wav", "ogg", "pdf",
    "txt", "xml",
];

const ASSET_TYPES: &[&str] = &["image", "stylesheet", "font", "script", "media", "other"];

const ASSET_SEGMENTS: &[&str] = &[
    "assets", "asset", "static", "images", "image", "img", "fonts", "font", "icons", "icon",
    "media", "scripts", "script", "styles", "style",
];

/// Whether a record looks like a static asset rather than an application
/// endpoint.
///
/// True when the last path segment has an asset extension, when every
/// observed resource type is an asset type, or when a query-less GET sits
/// under a conventional asset directory.
pub fn is_static_asset(record: &EndpointRecord) -> bool {
    let path = record.path_template.to_ascii_lowercase();
    let last = path.rsplit('/').next().unwrap_or("");
    if let Some((_, ext)) = last.rsplit_once('.') {
        if ASSET_EXTENSIONS.contains(&ext) {
            return true;
        }
    }

    if !record.types.is_empty()
        && record
            .types
            .iter()
            .all(|t| ASSET_TYPES.contains(&t.to_ascii_lowercase().as_str()))
    {
        return true;
    }

    record.method == "GET"
        && record.query_skeleton.is_empty()
        && path
            .split('/')
            .filter(|s| !s.is_empty())
            .any(|s| ASSET_SEGMENTS.contains(&s))
}
