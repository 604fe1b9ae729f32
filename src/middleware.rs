use super::errors::ServerError;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Every route renders HTML, so handlers return plain strings and this
/// fixes up the content type.
pub async fn html_headers<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<Response, ServerError> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str("text/html; charset=utf-8")?,
    );

    Ok(response)
}
