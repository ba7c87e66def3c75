// crates/survey-gate-server/src/client_ip.rs
// ============================================================================
// Module: Client Address Extraction
// Description: Resolves the client address used for rate limiting.
// Purpose: Honor proxy headers only when the deployment trusts them.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! The rate limiter keys on a hash of the client address. Behind a reverse
//! proxy the socket peer is the proxy itself, so the first `X-Forwarded-For`
//! hop (then `X-Real-IP`) is used instead, but only when
//! `server.trust_forwarded_headers` is set. Header values that do not parse as
//! an IP address are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::SocketAddr;

use axum::http::HeaderMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Standard proxy chain header.
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
/// Single-address proxy header.
const REAL_IP_HEADER: &str = "x-real-ip";

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Returns the client address string for rate limiting.
#[must_use]
pub fn client_address(headers: &HeaderMap, peer: SocketAddr, trust_forwarded: bool) -> String {
    if trust_forwarded
        && let Some(ip) = forwarded_ip(headers)
    {
        return ip.to_string();
    }
    peer.ip().to_string()
}

/// Reads the first trusted proxy header that carries a valid address.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let first_hop = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());
    first_hop.or_else(|| {
        headers
            .get(REAL_IP_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
