//! Client address resolution behind proxies.

use std::net::IpAddr;

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName};
use axum::middleware::Next;
use axum::response::Response;

const TRUE_CLIENT_IP: HeaderName = HeaderName::from_static("true-client-ip");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Client IP reported by a fronting proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealIp(pub IpAddr);

/// Resolve the client IP from proxy headers.
///
/// Precedence: `True-Client-IP`, `X-Real-IP`, then the first entry of
/// `X-Forwarded-For`. Unparseable values are ignored.
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let single = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    };

    single(&TRUE_CLIENT_IP)
        .or_else(|| single(&X_REAL_IP))
        .or_else(|| {
            headers
                .get(&X_FORWARDED_FOR)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .and_then(|first| first.trim().parse().ok())
        })
}

/// Attach a [`RealIp`] extension when the proxy headers name a client.
pub async fn resolve_real_ip(mut request: Request, next: Next) -> Response {
    if let Some(ip) = client_ip(request.headers()) {
        request.extensions_mut().insert(RealIp(ip));
    }
    next.run(request).await
}
