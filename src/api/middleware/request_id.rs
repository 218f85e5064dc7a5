use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Propagates the caller's `x-request-id`, or assigns a fresh one, on both
/// the request and the response. Log lines emitted while handling the
/// request carry the id.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get("x-request-id")
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    req.headers_mut().insert("x-request-id", header.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %header.to_str().unwrap_or("unknown")
    );
    let mut response = next.run(req).instrument(span).await;

    response.headers_mut().insert("x-request-id", header);
    response
}
