use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request};

/// Caller address used as the rate-limit identity.
///
/// The first `X-Forwarded-For` entry wins when the proxy in front of us is trusted;
/// otherwise the socket peer. `None` when neither is available (in-process tests).
#[must_use]
pub fn client_ip(req: &Request, trust_forwarded_for: bool) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
