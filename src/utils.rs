//! Display helpers shared by both views.
//!
//! - Text truncation for sidebar labels
//! - Image path normalization and asset URL composition
//! - Long-form date display
//! - Fixed-size list windows for the sidebar and grid

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Label length used for sidebar titles.
pub const LABEL_MAX: usize = 45;

/// Number of items shown in the "Trending Stories" sidebar.
pub const SIDEBAR_WINDOW: usize = 6;

/// Number of cards shown in the bottom grid.
pub const GRID_WINDOW: usize = 4;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to `max` characters, appending [`ELLIPSIS`] when anything was cut.
///
/// Text of `max` characters or fewer comes back unchanged. Lengths are counted
/// in characters, never bytes, so multi-byte text is never split.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_text("Hello World", 5), "Hello...");
/// assert_eq!(truncate_text("Hello", 5), "Hello");
/// ```
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Convert backend image paths to forward-slash form.
pub fn normalize_image_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Compose the public URL of a backend static asset.
///
/// Mirrors the backend's convention of serving uploads relative to its root,
/// so `uploads\a.png` under `https://host/` becomes `https://host/uploads/a.png`.
pub fn asset_url(base_url: &str, path: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    match path {
        Some(p) => format!("{}/{}", base, normalize_image_path(p)),
        None => format!("{}/", base),
    }
}

/// Format a backend timestamp as a long US English date, e.g. "May 6, 2025".
///
/// Accepts RFC 3339 timestamps, ISO timestamps without an offset and bare
/// `YYYY-MM-DD` dates. Anything else, including a missing value, renders as
/// "Invalid Date".
pub fn format_display_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "Invalid Date".to_string();
    };
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match date {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(e) => {
            tracing::debug!(%raw, error = %e, "Unparseable timestamp");
            "Invalid Date".to_string()
        }
    }
}

/// The first `n` items of `items`, in their original order.
pub fn window<T>(items: &[T], n: usize) -> &[T] {
    &items[..items.len().min(n)]
}
