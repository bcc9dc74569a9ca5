// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::error::{AccessError, MediaError, ServiceError, UploadError};

/// Error returned to HTTP clients as `{"error": "<message>"}`
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    InvalidMediaType(String),
    PayloadTooLarge(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    /// Logged in full, reported to the client with a generic message
    Internal(String),
}

impl ApiError {
    pub fn not_found<T: ToString>(t: T) -> Self {
        ApiError::NotFound(t.to_string())
    }

    pub fn internal<T: ToString>(t: T) -> Self {
        ApiError::Internal(t.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidMediaType(_)
            | ApiError::PayloadTooLarge(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                error!("Request failed: {}", err);
                "Internal server error".to_string()
            }
            ApiError::Validation(msg)
            | ApiError::InvalidMediaType(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::MissingIdentity => ApiError::Unauthorized(err.to_string()),
            AccessError::NotOwner { .. } => {
                ApiError::Forbidden("Not authorized to delete this podcast".to_string())
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidType { .. } => ApiError::InvalidMediaType(err.to_string()),
            MediaError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            // the client hung up or sent a malformed part
            MediaError::StreamFailed { .. } => ApiError::Validation(err.to_string()),
            other => ApiError::internal(other),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Media(media) => media.into(),
            UploadError::MissingTitle
            | UploadError::MissingAudio
            | UploadError::DuplicateFile(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => ApiError::not_found("Podcast not found"),
            ServiceError::Upload(upload) => upload.into(),
            ServiceError::Access(access) => access.into(),
            ServiceError::Media(media) => media.into(),
            other => ApiError::internal(other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
