// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;

use super::{ApiError, AppState};
use crate::access::Identity;
use crate::catalog::EpisodeQuery;
use crate::config::Config;
use crate::episode::Episode;
use crate::error::ServiceError;
use crate::feed::{FEED_CONTENT_TYPE, render_feed};
use crate::media::MediaKind;
use crate::upload::UploadDraft;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EpisodeQuery>,
) -> Result<Json<Vec<Episode>>, ApiError> {
    Ok(Json(state.service.list(&query).await?))
}

pub async fn list_by_author(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Episode>>, ApiError> {
    Ok(Json(state.service.list_by_author(&user_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Episode>, ApiError> {
    Ok(Json(state.service.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Episode>), ApiError> {
    let mut multipart = multipart?;
    let mut draft = state.service.begin_upload();

    if let Err(e) = read_upload(&mut draft, &mut multipart).await {
        draft.discard().await;
        return Err(e);
    }

    let episode = state.service.create(&identity, draft).await?;
    Ok((StatusCode::CREATED, Json(episode)))
}

pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.service.delete(&identity, &id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let episode = state.service.get(&id).await?;
    let base_url = base_url(&state.config, &headers);
    let xml = render_feed(&episode, &base_url).map_err(ServiceError::from)?;

    Ok(([(header::CONTENT_TYPE, FEED_CONTENT_TYPE)], xml))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Feed text fields and file parts into the draft in arrival order
async fn read_upload(
    draft: &mut UploadDraft<'_>,
    multipart: &mut Multipart,
) -> Result<(), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match MediaKind::from_field_name(&name) {
            Some(kind) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                // browsers send an empty part when no file was chosen
                if file_name.is_empty() {
                    continue;
                }
                let mime_type = field.content_type().map(str::to_string);
                debug!(field = %name, file_name = %file_name, "Receiving upload");
                draft
                    .attach(kind, field, &file_name, mime_type.as_deref())
                    .await?;
            }
            None => {
                let value = field.text().await?;
                draft.set_field(&name, value);
            }
        }
    }

    Ok(())
}

/// Origin for absolute feed links
fn base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(url) = &config.http.public_url {
        return url.as_str().trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("http");

    format!("{}://{}", scheme, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_url_prefers_configured_public_url() {
        let mut config = Config::default();
        config.http.public_url = Some("https://pods.example.org/".parse().unwrap());

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:3001"));

        assert_eq!(base_url(&config, &headers), "https://pods.example.org");
    }

    #[test]
    fn base_url_derives_from_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("pods.example.org"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        assert_eq!(
            base_url(&Config::default(), &headers),
            "https://pods.example.org"
        );
    }

    #[test]
    fn base_url_defaults_to_plain_http() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3001"));

        assert_eq!(
            base_url(&Config::default(), &headers),
            "http://localhost:3001"
        );
    }
}
