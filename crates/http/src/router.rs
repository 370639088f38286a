//! Router builder for the shelf HTTP server

use axum::{
    http::{HeaderValue, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Router,
};
use std::time::Duration;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use crate::error::AppError;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `mount_path`; `/` merges into the root
    pub fn mount_module(mut self, mount_path: &str, module_router: Router) -> Self {
        self.router = if mount_path == "/" {
            self.router.merge(module_router)
        } else {
            self.router.nest(mount_path, module_router)
        };
        self
    }

    /// Answer unmatched paths with a 404 page
    pub fn with_not_found(mut self) -> Self {
        self.router = self
            .router
            .fallback(|| async { AppError::not_found("no page at this address") });
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add request ID middleware; the id is echoed on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware; a timed-out request gets the 408 error page
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(timeout_ms),
            ))
            .layer(middleware::map_response(timeout_page));
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn timeout_page(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        AppError::Timeout.into_response()
    } else {
        response
    }
}

/// Time-ordered request ids
#[derive(Clone)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
