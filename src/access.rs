// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caller identity and ownership checks.
//!
//! The identity is whatever opaque id the client puts in the `x-user-id`
//! header. Nothing here verifies it: the header is an asserted capability,
//! not an authenticated principal. Verifying tokens issued by the external
//! identity provider has to happen in front of this gate before the server
//! is exposed to untrusted clients.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::api::ApiError;
use crate::episode::Episode;
use crate::error::AccessError;

/// Header carrying the caller's identity
pub const IDENTITY_HEADER: &str = "x-user-id";

/// Opaque identity asserted by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    /// Wrap a non-blank id
    pub fn new(id: impl Into<String>) -> Result<Self, AccessError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AccessError::MissingIdentity);
        }
        Ok(Self(id))
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AccessError> {
        let value = headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AccessError::MissingIdentity)?;
        Self::new(value.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fail with `NotOwner` unless this identity uploaded `episode`
    pub fn ensure_owns(&self, episode: &Episode) -> Result<(), AccessError> {
        if episode.author_id == self.0 {
            Ok(())
        } else {
            Err(AccessError::NotOwner {
                id: episode.id.clone(),
            })
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity::from_headers(&parts.headers)?)
    }
}
