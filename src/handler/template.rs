//! Embedded-expression templates
//!
//! Supported tags:
//! - `<%= path %>` writes the value HTML-escaped
//! - `<%- path %>` writes the value unescaped
//! - `<%# ... %>` is a comment
//! - a bare `<% path %>` behaves like `<%-`
//!
//! `path` is a dotted lookup into the render parameters. Strings are written
//! as-is, every other value as compact JSON with `<` written as `\u003c`, so
//! JSON dropped into a `<script>` block cannot close it.

use crate::error::TemplateError;
use serde_json::Value;

const OPEN: &str = "<%";
const CLOSE: &str = "%>";

/// Render `source` against `params`
pub fn render(source: &str, params: &Value) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let tag_start = offset + start;
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or(TemplateError::Unterminated(tag_start))?;
        let tag = &after_open[..end];

        match tag.chars().next() {
            Some('=') => out.push_str(&escape_html(&lookup(tag[1..].trim(), params, tag_start)?)),
            Some('-') => out.push_str(&lookup(tag[1..].trim(), params, tag_start)?),
            Some('#') => {}
            _ => out.push_str(&lookup(tag.trim(), params, tag_start)?),
        }

        let consumed = start + OPEN.len() + end + CLOSE.len();
        rest = &rest[consumed..];
        offset += consumed;
    }

    out.push_str(rest);
    Ok(out)
}

fn lookup(expr: &str, params: &Value, at: usize) -> Result<String, TemplateError> {
    if expr.is_empty() {
        return Err(TemplateError::EmptyExpression(at));
    }

    let value = expr
        .split('.')
        .try_fold(params, |current, key| current.get(key))
        .ok_or_else(|| TemplateError::Undefined(expr.to_string()))?;

    Ok(match value {
        Value::String(s) => s.clone(),
        other => other.to_string().replace('<', "\\u003c"),
    })
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
