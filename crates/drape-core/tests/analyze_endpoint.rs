//! End-to-end tests for `POST /api/analyze`.
//!
//! The relay runs on a random local port; the vision provider and the
//! language model are wiremock servers.

use drape_core::{router, Analyzer, AppState, Config};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];

struct Relay {
    url: String,
    vision: MockServer,
    llm: MockServer,
    upload_dir: TempDir,
}

impl Relay {
    async fn start(with_credentials: bool) -> Self {
        let vision = MockServer::start().await;
        let llm = MockServer::start().await;
        let upload_dir = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.vision.endpoint = vision.uri();
        config.llm.endpoint = llm.uri();
        config.server.upload_dir = upload_dir.path().to_path_buf();
        if with_credentials {
            config.vision.api_key = "test-key".to_string();
            config.vision.api_secret = "test-secret".to_string();
            config.llm.api_key = "gsk-test".to_string();
        } else {
            config.vision.api_key = String::new();
            config.vision.api_secret = String::new();
            config.llm.api_key = String::new();
        }

        let state = AppState::new(Analyzer::from_config(&config), "image");
        let app = router(state, 10 * 1024 * 1024);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            vision,
            llm,
            upload_dir,
        }
    }

    async fn post(&self, form: Form) -> (u16, Value) {
        let resp = reqwest::Client::new()
            .post(format!("{}/api/analyze", self.url))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post_image(&self) -> (u16, Value) {
        let part = Part::bytes(JPEG.to_vec())
            .file_name("look.jpg")
            .mime_str("image/jpeg")
            .unwrap();
        self.post(Form::new().part("image", part)).await
    }

    fn staged_files(&self) -> usize {
        count_files(self.upload_dir.path())
    }

    async fn mount_upload(&self, body: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/uploads"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.vision)
            .await;
    }

    async fn mount_tags(&self, response: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path("/tags"))
            .and(query_param("image_upload_id", "u1"))
            .respond_with(response)
            .expect(times)
            .mount(&self.vision)
            .await;
    }

    async fn mount_colors(&self, response: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path("/colors"))
            .and(query_param("image_upload_id", "u1"))
            .respond_with(response)
            .expect(times)
            .mount(&self.vision)
            .await;
    }

    async fn mount_completion(&self, content: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("json_object"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
            .expect(times)
            .mount(&self.llm)
            .await;
    }

    async fn expect_no_calls(&self) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.vision)
            .await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.llm)
            .await;
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52 }
    })
}

fn tags_body() -> Value {
    json!({ "result": { "tags": [ { "tag": { "en": "jacket" } } ] } })
}

fn colors_body() -> Value {
    json!({
        "result": {
            "dominant_colors": [ { "color_name": "Navy Blue" } ],
            "image_colors": [ { "color_name": "White" } ]
        }
    })
}

#[tokio::test]
async fn test_successful_analysis() {
    let relay = Relay::start(true).await;
    relay
        .mount_upload(json!({ "result": { "upload_id": "u1" } }), 1)
        .await;
    relay
        .mount_tags(ResponseTemplate::new(200).set_body_json(tags_body()), 1)
        .await;
    relay
        .mount_colors(ResponseTemplate::new(200).set_body_json(colors_body()), 1)
        .await;
    relay
        .mount_completion(r#"{"recommendations":["Try a navy bomber jacket"]}"#, 1)
        .await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "tags": [ { "tag": { "en": "jacket" } } ],
            "colors": {
                "dominant_colors": [ { "color_name": "Navy Blue" } ],
                "image_colors": [ { "color_name": "White" } ]
            },
            "fashion_recommendations": [ "Try a navy bomber jacket" ]
        })
    );
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_llm_receives_normalized_brief() {
    let relay = Relay::start(true).await;
    relay
        .mount_upload(json!({ "result": { "upload_id": "u1" } }), 1)
        .await;
    relay
        .mount_tags(ResponseTemplate::new(200).set_body_json(tags_body()), 1)
        .await;
    relay
        .mount_colors(ResponseTemplate::new(200).set_body_json(colors_body()), 1)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("llama-3.3-70b-versatile"))
        .and(body_string_contains(
            r#"{\"tags\":[\"jacket\"],\"dominant_colors\":[\"Navy Blue\"],\"image_colors\":[\"White\"]}"#,
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"recommendations":["Layer it"]}"#)),
        )
        .expect(1)
        .mount(&relay.llm)
        .await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 200);
    assert_eq!(body["fashion_recommendations"], json!(["Layer it"]));
}

#[tokio::test]
async fn test_missing_file_is_400_without_calls() {
    let relay = Relay::start(true).await;
    relay.expect_no_calls().await;

    let (status, body) = relay.post(Form::new().text("note", "no file here")).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "No image uploaded" }));
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_text_field_named_image_is_not_a_file() {
    let relay = Relay::start(true).await;
    relay.expect_no_calls().await;

    let (status, body) = relay.post(Form::new().text("image", "not a file")).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "No image uploaded" }));
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_colors_without_color_lists_are_empty() {
    let relay = Relay::start(true).await;
    relay
        .mount_upload(json!({ "result": { "upload_id": "u1" } }), 1)
        .await;
    relay
        .mount_tags(ResponseTemplate::new(200).set_body_json(tags_body()), 1)
        .await;
    relay
        .mount_colors(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": { "upload_id": "u1", "error": "partial" } })),
            1,
        )
        .await;
    relay
        .mount_completion(r#"{"recommendations":["Add a pop of color"]}"#, 1)
        .await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 200);
    assert_eq!(body["colors"], json!({}));
    assert_eq!(body["fashion_recommendations"], json!(["Add a pop of color"]));
    assert!(!body.to_string().contains("partial"));
}

#[tokio::test]
async fn test_non_multipart_body_is_400() {
    let relay = Relay::start(true).await;
    relay.expect_no_calls().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/analyze", relay.url))
        .json(&json!({ "image": "not a file" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No image uploaded");
}

#[tokio::test]
async fn test_missing_credentials_is_500_without_calls() {
    let relay = Relay::start(false).await;
    relay.expect_no_calls().await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Missing Imagga credentials" }));
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_missing_upload_id_stops_flow() {
    let relay = Relay::start(true).await;
    relay.mount_upload(json!({ "result": {} }), 1).await;
    relay
        .mount_tags(ResponseTemplate::new(200).set_body_json(tags_body()), 0)
        .await;
    relay
        .mount_colors(ResponseTemplate::new(200).set_body_json(colors_body()), 0)
        .await;
    relay.mount_completion("{}", 0).await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Image analysis failed");
    assert_eq!(body["details"], "Upload ID not received");
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_tags_failure_aborts_and_cleans_up() {
    let relay = Relay::start(true).await;
    relay
        .mount_upload(json!({ "result": { "upload_id": "u1" } }), 1)
        .await;
    relay
        .mount_tags(
            ResponseTemplate::new(500).set_body_json(json!({ "status": { "type": "error" } })),
            1,
        )
        .await;
    // Colors is fetched concurrently, so it may or may not complete.
    Mock::given(method("GET"))
        .and(path("/colors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(colors_body()))
        .mount(&relay.vision)
        .await;
    relay.mount_completion("{}", 0).await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 500);
    assert_eq!(
        body,
        json!({
            "error": "Image analysis failed",
            "details": "Request failed with status code 500"
        })
    );
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_unparseable_recommendations_return_empty_list() {
    let relay = Relay::start(true).await;
    relay
        .mount_upload(json!({ "result": { "upload_id": "u1" } }), 1)
        .await;
    relay
        .mount_tags(ResponseTemplate::new(200).set_body_json(tags_body()), 1)
        .await;
    relay
        .mount_colors(ResponseTemplate::new(200).set_body_json(colors_body()), 1)
        .await;
    relay
        .mount_completion("Navy and white is a classic pairing.", 1)
        .await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 200);
    assert_eq!(body["fashion_recommendations"], json!([]));
    assert_eq!(body["tags"], json!([ { "tag": { "en": "jacket" } } ]));
}

#[tokio::test]
async fn test_llm_rejection_is_500() {
    let relay = Relay::start(true).await;
    relay
        .mount_upload(json!({ "result": { "upload_id": "u1" } }), 1)
        .await;
    relay
        .mount_tags(ResponseTemplate::new(200).set_body_json(tags_body()), 1)
        .await;
    relay
        .mount_colors(ResponseTemplate::new(200).set_body_json(colors_body()), 1)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "bad key" } })),
        )
        .expect(1)
        .mount(&relay.llm)
        .await;

    let (status, body) = relay.post_image().await;

    assert_eq!(status, 500);
    assert_eq!(body["details"], "Request failed with status code 401");
    assert!(!body.to_string().contains("bad key"));
    assert_eq!(relay.staged_files(), 0);
}

#[tokio::test]
async fn test_health() {
    let relay = Relay::start(false).await;

    let body: Value = reqwest::get(format!("{}/health", relay.url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], drape_core::VERSION);
    assert_eq!(body["configured"], false);
}
