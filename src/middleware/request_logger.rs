//! Request logging middleware.
//!
//! Tags every request with an `x-request-id` (client-supplied or generated)
//! and logs its start and completion under the `api` target.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= 64)
            .map(String::from)
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        info!(
            target: "api",
            request_id = %request_id,
            method = %method,
            path = %path,
            remote_addr = %remote_addr,
            "→ Request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let elapsed = start.elapsed();
            let status = res.status();

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if status.is_success() || status.is_redirection() {
                info!(
                    target: "api",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms = %elapsed.as_millis(),
                    "← Request completed"
                );
            } else if status.is_client_error() {
                warn!(
                    target: "api",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms = %elapsed.as_millis(),
                    "← Client error"
                );
            } else {
                warn!(
                    target: "api",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms = %elapsed.as_millis(),
                    "← Server error"
                );
            }

            Ok(res)
        })
    }
}
