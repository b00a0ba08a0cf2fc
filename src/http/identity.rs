//! Resolving the calling user from a request.
//!
//! Authentication happens upstream (gateway, Hasura, ingress). The routers
//! only need the user id it forwards.

use axum::http::header::{HeaderName, InvalidHeaderName};
use axum::http::HeaderMap;

use crate::ids::UserId;

pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

/// Yields the already-authenticated user of a request, if any.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Reads the user id from one request header.
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: HeaderName,
}

impl HeaderIdentity {
    pub fn new(header: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::from_bytes(header.trim().to_ascii_lowercase().as_bytes())?,
        })
    }

    pub fn header(&self) -> &str {
        self.header.as_str()
    }
}

impl Default for HeaderIdentity {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
        }
    }
}

impl IdentityResolver for HeaderIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserId> {
        let raw = headers.get(&self.header)?.to_str().ok()?;
        UserId::new(raw).ok()
    }
}
