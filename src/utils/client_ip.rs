//! Client address extraction for rate limiting.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};
use std::net::SocketAddr;

/// Returns the address rate limits are keyed on.
///
/// With `behind_proxy`, the first entry of `X-Forwarded-For` wins, then
/// `X-Real-IP`. Otherwise (or when neither header is usable) the peer socket
/// address from [`ConnectInfo`] is used. Only enable `behind_proxy` when a
/// trusted proxy overwrites these headers, or clients can pick their own key.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, behind_proxy: bool) -> Option<String> {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return Some(ip.to_string());
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}
