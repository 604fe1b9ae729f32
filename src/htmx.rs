//! HTMX utils

use axum::http::HeaderMap;

/// htmx sets `Hx-Request` on every request it issues; anything else is a
/// plain browser navigation and needs a full page.
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.contains_key("Hx-Request")
}
