//! Static file serving module
//!
//! Maps a request path onto the static root, reads the file and returns it
//! with the Content-Type for its extension. Every request reads from disk.

use crate::http::{self, mime, HttpResponse};
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Literal prefix that always routes to the static server
pub const STATIC_PREFIX: &str = "/static";

/// Static asset location
#[derive(Debug, Clone)]
pub struct StaticFiles {
    route: String,
    root: PathBuf,
    contain: bool,
}

impl StaticFiles {
    pub fn new(route: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            route: normalize_prefix(route),
            root: root.into(),
            contain: false,
        }
    }

    /// Reject files that resolve outside the static root
    #[must_use]
    pub const fn contained(mut self, contain: bool) -> Self {
        self.contain = contain;
        self
    }

    /// URL prefix the assets are mounted under, e.g. `/static`
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve the file addressed by `request_path`
    pub async fn serve(&self, request_path: &str, base_path: &str) -> HttpResponse {
        let relative = self.relative_path(request_path, base_path);
        let decoded = match percent_decode_str(relative).decode_utf8() {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(
                    path = request_path,
                    error = %e,
                    "static path is not valid UTF-8"
                );
                return http::build_500_response();
            }
        };

        let file_path = self.root.join(decoded.as_ref());
        match self.load(&file_path).await {
            Ok(Some(content)) => {
                let content_type = mime::content_type_for_path(&file_path);
                tracing::debug!(
                    path = %file_path.display(),
                    bytes = content.len(),
                    content_type,
                    "serving static file"
                );
                http::build_file_response(content, content_type)
            }
            Ok(None) => http::build_404_response(),
            Err(e) => {
                // Missing files are the common case, keep them out of the warn log
                if e.kind() == io::ErrorKind::NotFound {
                    tracing::debug!(path = %file_path.display(), "static file not found");
                } else {
                    tracing::warn!(
                        path = %file_path.display(),
                        error = %e,
                        "static file unavailable"
                    );
                }
                http::build_404_response()
            }
        }
    }

    /// Strip the static mount prefix, trying the base-path-joined route,
    /// then the route, then the literal `/static`
    fn relative_path<'a>(&self, request_path: &'a str, base_path: &str) -> &'a str {
        let mounted = join_paths(base_path, &self.route);
        let stripped = [mounted.as_str(), self.route.as_str(), STATIC_PREFIX]
            .into_iter()
            .find_map(|prefix| request_path.strip_prefix(prefix))
            .unwrap_or(request_path);
        stripped.trim_start_matches('/')
    }

    /// `Ok(None)` when the path exists but is not a servable file
    async fn load(&self, file_path: &Path) -> io::Result<Option<Vec<u8>>> {
        if self.contain && !self.is_contained(file_path).await? {
            tracing::warn!(
                path = %file_path.display(),
                "path traversal attempt blocked"
            );
            return Ok(None);
        }

        let metadata = fs::metadata(file_path).await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        fs::read(file_path).await.map(Some)
    }

    async fn is_contained(&self, file_path: &Path) -> io::Result<bool> {
        let root = fs::canonicalize(&self.root).await?;
        let file = fs::canonicalize(file_path).await?;
        Ok(file.starts_with(root))
    }
}

/// Ensure a leading slash and drop trailing ones; the root stays `/`
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Join two normalized prefixes without doubling the slash
pub fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
