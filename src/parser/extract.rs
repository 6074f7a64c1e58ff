use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::FormError;

pub const MARKER: &str = "FB_PUBLIC_LOAD_DATA_";

static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FB_PUBLIC_LOAD_DATA_\s*=\s*(\[[\s\S]*?\]);").unwrap());
static SCRIPT_ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)FB_PUBLIC_LOAD_DATA_\s*=\s*(\[.+\])\s*;").unwrap());

/// Locate the array literal assigned to `FB_PUBLIC_LOAD_DATA_` in a page.
///
/// Tries a direct match on the raw HTML first, then walks the script tags
/// and isolates the literal inside the first one naming the marker.
pub fn extract(html: &str) -> Result<String, FormError> {
    if let Some(caps) = ASSIGNMENT_RE.captures(html) {
        debug!("data literal matched in raw html");
        return Ok(caps[1].trim().to_string());
    }

    let script = find_marker_script(html).ok_or_else(|| {
        FormError::MarkerNotFound(format!(
            "Unable to find the script tag containing {}",
            MARKER
        ))
    })?;

    if let Some(caps) = SCRIPT_ASSIGNMENT_RE.captures(&script) {
        debug!("data literal matched inside script tag");
        return Ok(caps[1].trim().to_string());
    }

    debug!("falling back to bracket slice of script body");
    Ok(bracket_slice(&script).to_string())
}

/// Body of the first `<script>` mentioning the marker.
fn find_marker_script(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let scripts = Selector::parse("script").ok()?;
    doc.select(&scripts)
        .map(|el| el.text().collect::<String>())
        .find(|body| body.contains(MARKER))
}

/// First `[` up to (not including) the last `;`. Empty when the body has
/// no such span, which then fails JSON parsing downstream.
fn bracket_slice(script: &str) -> &str {
    match (script.find('['), script.rfind(';')) {
        (Some(start), Some(end)) if start < end => script[start..end].trim(),
        _ => "",
    }
}
