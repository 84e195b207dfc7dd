//! Request id middleware.
//!
//! Takes `request_id` from the query string (or generates one), stores it in
//! the request extensions for handlers, opens an `http_request` span that
//! every log line of the request inherits, and echoes the id back in the
//! `x-request-id` response header.

use crate::domain::request_id::RequestId;
use axum::extract::Query;
use axum::http::{HeaderValue, Request, Response};
use serde::Deserialize;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{info, info_span, Instrument, Span};

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Deserialize)]
struct RequestIdParam {
    request_id: Option<String>,
}

/// Layer that assigns a request id and span to each request
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Request id service
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();

        let request_id = extract_request_id(&req);
        req.extensions_mut().insert(request_id.clone());

        let span = info_span!(
            "http_request",
            request_id = %request_id,
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let result = inner.call(req).await;

                if let Ok(response) = &result {
                    let status = response.status();
                    Span::current().record("http.status", status.as_u16());
                    info!(status = status.as_u16(), "Request completed");
                }

                result.map(|mut response| {
                    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                        response.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                    response
                })
            }
            .instrument(span),
        )
    }
}

/// Request id from the `request_id` query parameter, or a fresh one.
fn extract_request_id<B>(req: &Request<B>) -> RequestId {
    let supplied = Query::<RequestIdParam>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(param)| param.request_id);
    RequestId::from_client(supplied.as_deref())
}
