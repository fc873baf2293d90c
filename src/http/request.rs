//! Request inspection.
//!
//! # Responsibilities
//! - Extract the presented API key
//! - Resolve the origin address used for per-origin rate limiting
//!
//! # Design Decisions
//! - The origin is the TCP peer address; forwarding headers are not trusted
//! - A non-UTF-8 key header counts as absent

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

use crate::security::API_KEY_HEADER;

/// The raw `X-API-Key` value, if present and valid UTF-8.
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Origin address of a connection.
pub fn origin(peer: SocketAddr) -> IpAddr {
    peer.ip()
}
