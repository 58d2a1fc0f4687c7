//! MIME type detection module
//!
//! Maps a file extension to the `Content-Type` served for it.

use std::path::Path;

/// Fallback for unknown or missing extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type for an extension, with or without the leading dot
///
/// Lookup is case-insensitive.
///
/// # Examples
/// ```
/// use board_router::http::mime::content_type_for;
/// assert_eq!(content_type_for(".js"), "application/javascript");
/// assert_eq!(content_type_for("PNG"), "image/png");
/// assert_eq!(content_type_for(".xyz"), "application/octet-stream");
/// ```
pub fn content_type_for(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        // Scripts
        "js" | "mjs" => "application/javascript",
        "map" | "json" => "application/json",
        "webmanifest" => "application/manifest+json",

        // Stylesheets and markup
        "css" => "text/css",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Get MIME Content-Type from a file path's extension
pub fn content_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(DEFAULT_CONTENT_TYPE, content_type_for)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type_for(".js"), "application/javascript");
        assert_eq!(content_type_for(".css"), "text/css");
        assert_eq!(content_type_for(".html"), "text/html");
        assert_eq!(content_type_for(".json"), "application/json");
        assert_eq!(content_type_for(".png"), "image/png");
        assert_eq!(content_type_for(".woff2"), "font/woff2");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for(".xyz"), "application/octet-stream");
        assert_eq!(content_type_for(""), "application/octet-stream");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(content_type_for(".JS"), "application/javascript");
        assert_eq!(content_type_for(".Svg"), "image/svg+xml");
    }

    #[test]
    fn test_from_path() {
        assert_eq!(content_type_for_path(Path::new("dist/main.CSS")), "text/css");
        assert_eq!(content_type_for_path(Path::new("LICENSE")), DEFAULT_CONTENT_TYPE);
    }
}
