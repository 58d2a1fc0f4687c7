//! Route pattern matching module
//!
//! Matches `/queues/:queueName/jobs/:jobId` style patterns against request paths.

use std::collections::HashMap;

/// Parameters captured from `:name` segments, keyed without the colon
pub type Params = HashMap<String, String>;

/// Match a concrete path against a route pattern
///
/// Both sides are split on `/` with empty segments dropped, so leading,
/// trailing and doubled slashes are insignificant. Segment counts must be
/// equal; `:name` segments bind the path segment verbatim and every other
/// segment must be byte-equal.
pub fn match_pattern(pattern: &str, path: &str) -> Option<Params> {
    let pattern_segments = segments(pattern);
    let path_segments = segments(path);

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), (*actual).to_string());
        } else if expected != actual {
            return None;
        }
    }

    Some(params)
}

fn segments(s: &str) -> Vec<&str> {
    s.split('/').filter(|seg| !seg.is_empty()).collect()
}
