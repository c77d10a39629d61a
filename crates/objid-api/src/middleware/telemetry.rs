//! Per-request span and access log.
//!
//! Every request runs inside an `http_request` span carrying the method,
//! the route template and the request id. The start and the outcome are
//! logged from inside that span under the `objid::http` target.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use axum::{
    extract::MatchedPath,
    http::{Request, Response},
};
use tower::{Layer, Service};
use tracing::{field::Empty, info, info_span, warn, Instrument, Span};

use super::request_id::request_id_of;

const TARGET: &str = "objid::http";

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestTelemetryLayer;

impl RequestTelemetryLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestTelemetryLayer {
    type Service = RequestTelemetry<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTelemetry { inner }
    }
}

#[derive(Clone, Debug)]
pub struct RequestTelemetry<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestTelemetry<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let path = request.uri().path().to_owned();
        // Unmatched requests fall back to the raw path
        let route = match request.extensions().get::<MatchedPath>() {
            Some(matched) => matched.as_str().to_owned(),
            None => path.clone(),
        };
        let request_id = request_id_of(request.headers()).unwrap_or("-").to_owned();

        let span = info_span!(
            "http_request",
            method = %request.method(),
            route = %route,
            request_id = %request_id,
            http.status_code = Empty,
        );

        let started = Instant::now();
        let mut inner = self.inner.clone();
        // Call the instance that was polled ready
        std::mem::swap(&mut inner, &mut self.inner);

        Box::pin(
            async move {
                info!(target: TARGET, %path, "request started");

                let response = inner.call(request).await?;
                let status = response.status();
                let duration_ms = started.elapsed().as_millis() as u64;
                Span::current().record("http.status_code", status.as_u16());

                if status.is_server_error() {
                    warn!(target: TARGET, %path, status = status.as_u16(), duration_ms, "request failed");
                } else {
                    info!(target: TARGET, %path, status = status.as_u16(), duration_ms, "request completed");
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}
