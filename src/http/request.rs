//! Request metadata shared by the interceptors.
//!
//! # Responsibilities
//! - Snapshot method, path and peer address before the request is consumed
//! - Expose the request's trace context by type
//!
//! # Design Decisions
//! - Snapshot taken as early as possible so it survives a handler panic
//! - Missing trace context renders as an empty trace id, never an error

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request};
use axum::http::Method;

use crate::http::middleware::real_ip::RealIp;
use crate::observability::{TraceContext, TraceId};

/// Read access to the request's trace context.
pub trait RequestTraceExt {
    fn trace_context(&self) -> Option<&TraceContext>;

    fn trace_id(&self) -> Option<TraceId> {
        self.trace_context().map(TraceContext::trace_id)
    }
}

impl<B> RequestTraceExt for axum::http::Request<B> {
    fn trace_context(&self) -> Option<&TraceContext> {
        self.extensions().get::<TraceContext>()
    }
}

/// What the interceptors need to know about a request after it is gone.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    pub remote_addr: Option<SocketAddr>,
    /// Client IP named by proxy headers, when present.
    pub real_ip: Option<IpAddr>,
    pub trace: Option<TraceContext>,
}

impl RequestInfo {
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            remote_addr: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            real_ip: request.extensions().get::<RealIp>().map(|RealIp(ip)| *ip),
            trace: request.trace_context().cloned(),
        }
    }

    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace.as_ref().map(TraceContext::trace_id)
    }

    /// Trace id for log fields; empty when the request was never traced.
    pub fn trace_id_field(&self) -> String {
        self.trace_id().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Proxy-reported client IP first, then the socket peer.
    pub fn remote(&self) -> RemoteAddr {
        match (self.real_ip, self.remote_addr) {
            (Some(ip), _) => RemoteAddr::Forwarded(ip),
            (None, Some(addr)) => RemoteAddr::Peer(addr),
            (None, None) => RemoteAddr::Unknown,
        }
    }
}

/// Client address rendered for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAddr {
    Forwarded(IpAddr),
    Peer(SocketAddr),
    Unknown,
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteAddr::Forwarded(ip) => ip.fmt(f),
            RemoteAddr::Peer(addr) => addr.fmt(f),
            RemoteAddr::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn snapshot_without_extensions() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/items/3?force=true")
            .body(Body::empty())
            .unwrap();
        let info = RequestInfo::from_request(&request);
        assert_eq!(info.method, Method::DELETE);
        assert_eq!(info.path, "/items/3");
        assert_eq!(info.remote().to_string(), "unknown");
        assert_eq!(info.trace_id_field(), "");
    }

    #[test]
    fn snapshot_reads_trace_and_peer() {
        let ctx = TraceContext::start(&Method::GET, "/health");
        let id = ctx.trace_id();
        let addr: SocketAddr = "10.0.0.7:51000".parse().unwrap();

        let mut request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        request.extensions_mut().insert(ctx);
        request.extensions_mut().insert(ConnectInfo(addr));

        let info = RequestInfo::from_request(&request);
        assert_eq!(info.trace_id(), Some(id));
        assert_eq!(request.trace_id(), Some(id));
        assert_eq!(info.remote().to_string(), "10.0.0.7:51000");
    }

    #[test]
    fn proxy_reported_ip_beats_peer() {
        let addr: SocketAddr = "10.0.0.7:51000".parse().unwrap();
        let ip: IpAddr = "203.0.113.9".parse().unwrap();

        let mut request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request.extensions_mut().insert(RealIp(ip));

        let info = RequestInfo::from_request(&request);
        assert_eq!(info.remote(), RemoteAddr::Forwarded(ip));
        assert_eq!(info.remote().to_string(), "203.0.113.9");
    }
}
