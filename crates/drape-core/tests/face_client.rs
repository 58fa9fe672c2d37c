//! Face detector client against a wiremock server.

use drape_core::config::FaceConfig;
use drape_core::face::QualityRating;
use drape_core::{FaceClient, FaceErrorKind};
use serde_json::json;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn client(server: &MockServer) -> FaceClient {
    FaceClient::new(&FaceConfig {
        endpoint: server.uri(),
        api_key: "face-key".to_string(),
        api_secret: "face-secret".to_string(),
        ..FaceConfig::default()
    })
}

async fn mount_detect_error(server: &MockServer, status: u16, message: &str) {
    Mock::given(method("POST"))
        .and(path("/facepp/v3/detect"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({
                "time_used": 3,
                "error_message": message,
                "request_id": "r-1"
            })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_detect_returns_first_face() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/facepp/v3/detect"))
        .and(query_param("api_key", "face-key"))
        .and(query_param("api_secret", "face-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "r-1",
            "faces": [
                {
                    "face_token": "t1",
                    "attributes": {
                        "gender": { "value": "Female" },
                        "age": { "value": 31 },
                        "facequality": { "value": 0.7, "threshold": 0.5 },
                        "emotion": { "happiness": 12.0, "neutral": 80.5, "sadness": 7.5 },
                        "hair": { "color": { "black": 90.0, "brown": 10.0 } }
                    }
                },
                { "face_token": "t2", "attributes": { "gender": { "value": "Male" } } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let attributes = client(&server)
        .detect("me.png", Some("image/png"), PNG.to_vec())
        .await
        .unwrap();
    let summary = attributes.summary();

    assert_eq!(summary.gender.as_deref(), Some("Female"));
    assert_eq!(summary.age, Some(31));
    assert_eq!(summary.dominant_emotion.as_deref(), Some("neutral"));
    assert_eq!(summary.hair_color.as_deref(), Some("black"));
    assert_eq!(summary.quality, QualityRating::Good);
}

#[tokio::test]
async fn test_no_faces_detected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/facepp/v3/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "faces": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .detect("me.png", None, PNG.to_vec())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FaceErrorKind::NoFaceDetected);
}

#[tokio::test]
async fn test_authorization_error_classified() {
    let server = MockServer::start().await;
    mount_detect_error(&server, 403, "AUTHORIZATION_ERROR: Denied by Client").await;

    let err = client(&server)
        .detect("me.png", None, PNG.to_vec())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FaceErrorKind::BadCredentials);
    assert_eq!(err.status_code, Some(403));
    assert!(err.to_string().contains("AUTHORIZATION_ERROR"));
}

#[tokio::test]
async fn test_invalid_face_classified() {
    let server = MockServer::start().await;
    mount_detect_error(&server, 400, "IMAGE_ERROR_INVALID_FACE").await;

    let err = client(&server)
        .detect("me.png", None, PNG.to_vec())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FaceErrorKind::InvalidFace);
}

#[tokio::test]
async fn test_rate_limit_and_outage_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/facepp/v3/detect"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/facepp/v3/detect"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let c = client(&server);
    let first = c.detect("me.png", None, PNG.to_vec()).await.unwrap_err();
    let second = c.detect("me.png", None, PNG.to_vec()).await.unwrap_err();

    assert_eq!(first.kind, FaceErrorKind::RateLimited);
    assert_eq!(second.kind, FaceErrorKind::ServiceUnavailable);
}

#[tokio::test]
async fn test_local_validation_happens_before_any_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let c = client(&server);

    let err = c
        .detect("anim.gif", Some("image/gif"), b"GIF89a".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::UnsupportedFormat);

    let mut big = PNG.to_vec();
    big.resize(3 * 1024 * 1024, 0);
    let err = c.detect("big.png", None, big).await.unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::ImageTooLarge);
}

#[tokio::test]
async fn test_missing_credentials_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let c = FaceClient::new(&FaceConfig {
        endpoint: server.uri(),
        api_key: String::new(),
        api_secret: String::new(),
        ..FaceConfig::default()
    });

    assert!(!c.has_credentials());
    let err = c.detect("me.png", None, PNG.to_vec()).await.unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::MissingCredentials);
    let err = c.check_connection().await.unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::MissingCredentials);
}

#[tokio::test]
async fn test_check_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/facepp/v3/get_app"))
        .and(query_param("api_key", "face-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "app_name": "drape", "status": "ok" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let info = client(&server).check_connection().await.unwrap();
    assert_eq!(info["app_name"], "drape");
}

#[tokio::test]
async fn test_check_connection_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/facepp/v3/get_app"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).check_connection().await.unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::BadCredentials);
}

#[tokio::test]
async fn test_unreachable_detector_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = FaceClient::new(&FaceConfig {
        endpoint: format!("http://{addr}"),
        api_key: "face-key".to_string(),
        api_secret: "face-secret".to_string(),
        ..FaceConfig::default()
    });

    let err = c.detect("me.png", None, PNG.to_vec()).await.unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::NetworkError);
    assert!(!err.to_string().contains("face-secret"));

    let err = c.check_connection().await.unwrap_err();
    assert_eq!(err.kind, FaceErrorKind::NetworkError);
}
