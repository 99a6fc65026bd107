//! Route handlers
//!
//! - `GET /tokens` issues a pair for a subject
//! - `POST /refresh` rotates a refresh secret
//! - `GET /health` liveness probe

pub mod health;
pub mod refresh;
pub mod tokens;

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

/// Longest origin recorded with a refresh token
const MAX_ORIGIN_LEN: usize = 64;

/// Client IP of the request without port, or `"unknown"`
///
/// Honors `Forwarded` and `X-Forwarded-For` before the peer address. The
/// value is recorded for audit only and never used for authorization.
pub fn client_origin(req: &HttpRequest) -> String {
    let info = req.connection_info();
    match info.realip_remote_addr().map(str::trim) {
        Some(addr) if !addr.is_empty() => host_only(addr).chars().take(MAX_ORIGIN_LEN).collect(),
        _ => "unknown".to_string(),
    }
}

fn host_only(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return ip.to_string();
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host.to_string()
        }
        _ => addr.to_string(),
    }
}
