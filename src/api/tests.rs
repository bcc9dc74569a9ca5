// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use chrono::{Duration, Utc};
use serde_json::Value;
use tempfile::{TempDir, tempdir};

use super::{AppState, router};
use crate::access::IDENTITY_HEADER;
use crate::catalog::{CatalogRepository, CatalogService, JsonFileCatalog};
use crate::config::Config;
use crate::episode::{Episode, EpisodeFields};
use crate::media::{DEFAULT_MAX_FILE_BYTES, MediaStore};

struct TestApp {
    server: TestServer,
    dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_episodes(Vec::new()).await
    }

    async fn with_episodes(episodes: Vec<Episode>) -> Self {
        let dir = tempdir().unwrap();
        Self::start(dir, episodes, Config::default()).await
    }

    /// Serve a built frontend whose index page is `index`
    async fn with_frontend(index: &str) -> Self {
        let dir = tempdir().unwrap();
        let frontend_dir = dir.path().join("dist");
        std::fs::create_dir_all(&frontend_dir).unwrap();
        std::fs::write(frontend_dir.join("index.html"), index).unwrap();

        let mut config = Config::default();
        config.http.frontend_dir = Some(frontend_dir);
        Self::start(dir, Vec::new(), config).await
    }

    async fn start(dir: TempDir, episodes: Vec<Episode>, config: Config) -> Self {
        let catalog = JsonFileCatalog::in_dir(&dir.path().join("data"));
        catalog.persist_all(&episodes).await.unwrap();

        let media = MediaStore::open(dir.path().join("uploads"), DEFAULT_MAX_FILE_BYTES)
            .await
            .unwrap();
        let service = CatalogService::new(Arc::new(catalog), media);
        let state = AppState::new(service, config);

        let server = TestServer::new(router(state)).unwrap();
        Self { server, dir }
    }

    fn stored_audio_files(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("uploads").join("audio"))
            .unwrap()
            .count()
    }

    async fn upload(&self, user: &'static str, form: MultipartForm) -> axum_test::TestResponse {
        self.server
            .post("/api/podcasts")
            .add_header(identity_header(), HeaderValue::from_static(user))
            .multipart(form)
            .await
    }
}

fn identity_header() -> HeaderName {
    HeaderName::from_static(IDENTITY_HEADER)
}

fn audio_part() -> Part {
    Part::bytes(b"ID3 fake audio".to_vec())
        .file_name("song.mp3")
        .mime_type("audio/mpeg")
}

fn episode_form(title: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_part("audio", audio_part())
}

fn seeded(title: &str, author_id: &str, age_minutes: i64) -> Episode {
    let mut episode = Episode::new(
        title,
        EpisodeFields::default(),
        author_id,
        format!("/uploads/audio/{title}.mp3"),
        None,
    );
    episode.created_at = Utc::now() - Duration::minutes(age_minutes);
    episode
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn upload_creates_episode_and_feed_references_it() {
    let app = TestApp::new().await;

    let response = app.upload("u1", episode_form("Ep1")).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "Ep1");
    assert_eq!(created["authorId"], "u1");
    assert_eq!(created["author"], "Anonymous");
    assert_eq!(created["category"], "Other");
    assert_eq!(created["duration"], "00:00");
    assert!(created["imageUrl"].is_null());

    let audio_url = created["audioUrl"].as_str().unwrap().to_string();
    let generated = audio_url.strip_prefix("/uploads/audio/").unwrap();
    assert!(generated.ends_with(".mp3"));
    assert_ne!(generated, "song.mp3");

    let id = created["id"].as_str().unwrap();
    let feed = app.server.get(&format!("/api/podcasts/{id}/feed")).await;

    assert_eq!(feed.status_code(), StatusCode::OK);
    assert_eq!(
        feed.header("content-type"),
        "application/rss+xml; charset=utf-8"
    );
    let xml = feed.text();
    assert!(xml.contains("<enclosure"));
    assert!(xml.contains(&audio_url));
    assert!(xml.contains("<itunes:duration>00:00</itunes:duration>"));
    assert!(xml.contains(&format!("<guid isPermaLink=\"false\">{id}</guid>")));
}

#[tokio::test]
async fn uploaded_audio_is_served_under_uploads() {
    let app = TestApp::new().await;
    let created: Value = app.upload("u1", episode_form("Ep1")).await.json();

    let response = app
        .server
        .get(created["audioUrl"].as_str().unwrap())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ID3 fake audio");
}

#[tokio::test]
async fn upload_keeps_optional_fields_and_image() {
    let app = TestApp::new().await;
    let form = episode_form("Ep1")
        .add_text("description", "About things")
        .add_text("author", "Alice")
        .add_text("category", "Technology")
        .add_text("duration", "01:02:03")
        .add_part(
            "image",
            Part::bytes(b"png".to_vec())
                .file_name("cover.png")
                .mime_type("image/png"),
        );

    let response = app.upload("u1", form).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["description"], "About things");
    assert_eq!(created["author"], "Alice");
    assert_eq!(created["category"], "Technology");
    assert_eq!(created["duration"], "01:02:03");
    assert!(
        created["imageUrl"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/images/")
    );
}

#[tokio::test]
async fn upload_without_identity_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/podcasts")
        .multipart(episode_form("Ep1"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized - No user ID provided");
    assert_eq!(app.stored_audio_files(), 0);
}

#[tokio::test]
async fn upload_without_audio_is_rejected() {
    let app = TestApp::new().await;
    let form = MultipartForm::new().add_text("title", "Ep1");

    let response = app.upload("u1", form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Audio file is required");
}

#[tokio::test]
async fn upload_without_title_leaves_no_files() {
    let app = TestApp::new().await;
    let form = MultipartForm::new().add_part("audio", audio_part());

    let response = app.upload("u1", form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Title is required");
    assert_eq!(app.stored_audio_files(), 0);
}

#[tokio::test]
async fn upload_of_executable_is_invalid_media_type() {
    let app = TestApp::new().await;
    let form = MultipartForm::new().add_text("title", "Ep1").add_part(
        "audio",
        Part::bytes(b"MZ".to_vec())
            .file_name("setup.exe")
            .mime_type("application/octet-stream"),
    );

    let response = app.upload("u1", form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid audio file type");
    assert_eq!(app.stored_audio_files(), 0);

    let listed: Vec<Value> = app.server.get("/api/podcasts").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn delete_by_non_owner_is_forbidden() {
    let app = TestApp::new().await;
    let created: Value = app.upload("owner", episode_form("Ep1")).await.json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .delete(&format!("/api/podcasts/{id}"))
        .add_header(identity_header(), HeaderValue::from_static("intruder"))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        app.server
            .get(&format!("/api/podcasts/{id}"))
            .await
            .status_code(),
        StatusCode::OK
    );
    assert_eq!(app.stored_audio_files(), 1);
}

#[tokio::test]
async fn delete_by_owner_removes_episode_and_media() {
    let app = TestApp::new().await;
    let created: Value = app.upload("owner", episode_form("Ep1")).await.json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .delete(&format!("/api/podcasts/{id}"))
        .add_header(identity_header(), HeaderValue::from_static("owner"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(app.stored_audio_files(), 0);

    let after = app.server.get(&format!("/api/podcasts/{id}")).await;
    assert_eq!(after.status_code(), StatusCode::NOT_FOUND);
    let body: Value = after.json();
    assert_eq!(body["error"], "Podcast not found");
}

#[tokio::test]
async fn delete_without_identity_is_unauthorized() {
    let app = TestApp::with_episodes(vec![seeded("one", "u1", 0)]).await;

    let response = app.server.delete("/api/podcasts/whatever").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_unknown_episode_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .server
        .delete("/api/podcasts/missing")
        .add_header(identity_header(), HeaderValue::from_static("u1"))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::with_episodes(vec![
        seeded("older", "u1", 10),
        seeded("newest", "u2", 0),
        seeded("middle", "u1", 5),
    ])
    .await;

    let listed: Vec<Value> = app.server.get("/api/podcasts").await.json();
    let titles: Vec<_> = listed.iter().map(|e| e["title"].as_str().unwrap()).collect();

    assert_eq!(titles, vec!["newest", "middle", "older"]);
}

#[tokio::test]
async fn list_by_user_only_returns_their_episodes() {
    let app = TestApp::with_episodes(vec![
        seeded("older", "u1", 10),
        seeded("theirs", "u2", 0),
        seeded("newer", "u1", 5),
    ])
    .await;

    let listed: Vec<Value> = app.server.get("/api/podcasts/user/u1").await.json();
    let titles: Vec<_> = listed.iter().map(|e| e["title"].as_str().unwrap()).collect();

    assert_eq!(titles, vec!["newer", "older"]);
}

#[tokio::test]
async fn list_filters_by_category_and_search_text() {
    let mut tech = seeded("Rust weekly", "u1", 0);
    tech.category = "Technology".to_string();
    let mut talk = seeded("Morning talk", "u1", 1);
    talk.description = "We chat about rust".to_string();
    let app = TestApp::with_episodes(vec![tech, talk, seeded("Other", "u2", 2)]).await;

    let by_category: Vec<Value> = app
        .server
        .get("/api/podcasts")
        .add_query_param("category", "Technology")
        .await
        .json();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0]["title"], "Rust weekly");

    let by_text: Vec<Value> = app
        .server
        .get("/api/podcasts")
        .add_query_param("q", "RUST")
        .await
        .json();
    let titles: Vec<_> = by_text.iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Rust weekly", "Morning talk"]);
}

#[tokio::test]
async fn feed_for_unknown_episode_is_not_found() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/podcasts/missing/feed").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let app = TestApp::new().await;

    let response = app.server.get("/nowhere").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn upload_without_multipart_body_is_json_error() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/podcasts")
        .add_header(identity_header(), HeaderValue::from_static("u1"))
        .json(&serde_json::json!({ "title": "Ep1" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert_eq!(app.stored_audio_files(), 0);
}

#[tokio::test]
async fn client_side_routes_get_frontend_index() {
    let app = TestApp::with_frontend("<html>spa</html>").await;

    let response = app.server.get("/podcast/abc").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "<html>spa</html>");
}

#[tokio::test]
async fn frontend_does_not_shadow_api_routes() {
    let app = TestApp::with_frontend("<html>spa</html>").await;

    let response = app.server.get("/api/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}
