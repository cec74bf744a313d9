//! Request correlation.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sent none
//! - Echo the ID back on the response
//! - Expose the ID to handlers and middleware
//! - Remember whether the ID came from the client or was generated here
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, so IDs survive hops
//! - Only client-supplied IDs count towards correlation coverage

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Correlation header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates random UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Outer layer: assign an ID to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuidV4> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuidV4)
}

/// Copy the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Whether the request arrived carrying its own correlation ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientCorrelation(pub bool);

/// Outermost middleware: record [`ClientCorrelation`] before an ID is
/// generated for requests that lack one.
pub async fn mark_client_correlation(mut request: Request<Body>, next: Next) -> Response {
    let supplied = request_id(&request).is_some();
    request.extensions_mut().insert(ClientCorrelation(supplied));
    next.run(request).await
}

/// True when [`mark_client_correlation`] saw a client-supplied ID.
pub fn client_supplied_id<B>(request: &Request<B>) -> bool {
    request
        .extensions()
        .get::<ClientCorrelation>()
        .is_some_and(|c| c.0)
}

/// The request's correlation ID, if it has a printable one.
pub fn request_id<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
