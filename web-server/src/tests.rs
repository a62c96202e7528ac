use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use newscheck_core::{
    ArtifactLoader, ArtifactMetadata, BinaryClassifier, FeatureVector, InferenceError,
    LoadedArtifacts, TextVectorizer,
};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

use crate::config::Config;
use crate::{create_router, AppState};

fn write_artifacts(dir: &Path) {
    let vectorizer = json!({
        "kind": "tfidf",
        "vocabulary": {
            "scientists": 0, "confirm": 1, "vaccine": 2, "safety": 3,
            "aliens": 4, "pyramids": 5, "built": 6
        },
        "idf": [1.5, 1.2, 1.0, 2.0, 2.5, 2.5, 1.1]
    });
    let model = json!({
        "kind": "voting",
        "voting": "soft",
        "estimators": [
            { "kind": "logistic_regression", "coef": [1.0, 1.0, 1.5, 1.5, -2.0, -2.0, -0.5], "intercept": 0.0 },
            {
                "kind": "multinomial_nb",
                "feature_log_prob": [
                    [-3.0, -3.0, -3.0, -3.0, -1.0, -1.0, -2.0],
                    [-1.0, -1.0, -1.0, -1.0, -3.0, -3.0, -2.0]
                ],
                "class_log_prior": [-0.69, -0.69]
            }
        ]
    });
    std::fs::write(dir.join("tfidf_vectorizer.json"), vectorizer.to_string()).unwrap();
    std::fs::write(dir.join("ensemble_fake_news_model.json"), model.to_string()).unwrap();
}

fn app_for(dir: &Path) -> Router {
    let config = Config {
        model_dir: dir.to_path_buf(),
        ..Config::default()
    };
    let loader = Arc::new(ArtifactLoader::new(config.artifact_paths()));
    create_router(AppState::new(config, loader))
}

/// Flags texts mentioning "garbled" in column 0
struct KeywordVectorizer;

impl TextVectorizer for KeywordVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector, InferenceError> {
        let hit = if text.contains("garbled") { 1.0 } else { 0.0 };
        Ok(FeatureVector::from_sparse(1, [(0, hit)]))
    }

    fn n_features(&self) -> usize {
        1
    }
}

/// Says REAL, but emits a three-column distribution for flagged texts
struct FlakyClassifier;

impl BinaryClassifier for FlakyClassifier {
    fn predict(&self, _x: &FeatureVector) -> Result<i64, InferenceError> {
        Ok(1)
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        if x.get(0) > 0.0 {
            Ok(vec![0.2, 0.3, 0.5])
        } else {
            Ok(vec![0.1, 0.9])
        }
    }

    fn n_features(&self) -> usize {
        1
    }
}

fn flaky_app() -> Router {
    let metadata = ArtifactMetadata {
        model_path: "flaky".to_string(),
        vectorizer_path: "keyword".to_string(),
        model_sha256: String::new(),
        vectorizer_sha256: String::new(),
        classifier_kind: "flaky".to_string(),
        vectorizer_kind: "keyword".to_string(),
        n_features: 1,
        vocabulary_size: 1,
        loaded_at: chrono::Utc::now(),
    };
    let artifacts = LoadedArtifacts::new(Box::new(FlakyClassifier), Box::new(KeywordVectorizer), metadata);
    let loader = Arc::new(ArtifactLoader::from_artifacts(artifacts));
    create_router(AppState::new(Config::default(), loader))
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(app: &Router, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Reply { status, cookie, body }
}

async fn check(app: &Router, cookie: Option<&str>, text: &str) -> Reply {
    send(app, "POST", "/api/v1/check", cookie, Some(json!({ "text": text }))).await
}

#[tokio::test]
async fn test_check_returns_result_and_history() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    let reply = check(&app, None, "Scientists confirm vaccine safety").await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.cookie.expect("session cookie");

    let result = &reply.body["result"];
    assert_eq!(result["label"], "REAL");
    let p_fake = result["probabilities"][0]["probability"].as_f64().unwrap();
    let p_real = result["probabilities"][1]["probability"].as_f64().unwrap();
    assert!((p_fake + p_real - 1.0).abs() < 1e-6);
    assert_eq!(result["confidence"].as_f64().unwrap(), p_real);
    assert_eq!(result["probabilities"][0]["category"], "Fake");
    assert_eq!(reply.body["history"]["items"].as_array().unwrap().len(), 1);

    let fake = check(&app, Some(&cookie), "Aliens built the pyramids").await;
    assert_eq!(fake.status, StatusCode::OK);
    assert_eq!(fake.body["result"]["label"], "FAKE");
    assert!(fake.cookie.is_none());

    let history = send(&app, "GET", "/api/v1/history", Some(&cookie), None).await;
    let items = history.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["label"], "FAKE");
    assert_eq!(items[1]["text"], "Scientists confirm vaccine safety");
}

#[tokio::test]
async fn test_blank_text_is_warning_without_history() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    let reply = check(&app, None, "   \n\t ").await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["code"], "empty_input");
    assert_eq!(reply.body["severity"], "warning");

    let cookie = reply.cookie.unwrap();
    let history = send(&app, "GET", "/api/v1/history", Some(&cookie), None).await;
    assert!(history.body["items"].as_array().unwrap().is_empty());
    assert_eq!(history.body["stored"], 0);
}

#[tokio::test]
async fn test_missing_artifacts_degrade() {
    let dir = tempdir().unwrap();
    let app = app_for(dir.path());

    let reply = check(&app, None, "Aliens built the pyramids").await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.body["code"], "artifacts_unavailable");
    assert_eq!(reply.body["remediation"].as_array().unwrap().len(), 3);

    let health = send(&app, "GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "degraded");

    let status = send(&app, "GET", "/api/v1/status", None, None).await;
    assert_eq!(status.body["artifacts"]["state"], "failed");
    assert_eq!(status.body["artifacts"]["code"], "not_found");
}

#[tokio::test]
async fn test_sessions_keep_separate_history() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    let alice = check(&app, None, "Scientists confirm vaccine safety").await.cookie.unwrap();
    let bob = check(&app, None, "Aliens built the pyramids").await.cookie.unwrap();
    assert_ne!(alice, bob);

    let alice_history = send(&app, "GET", "/api/v1/history", Some(&alice), None).await;
    let items = alice_history.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "Scientists confirm vaccine safety");
}

#[tokio::test]
async fn test_history_window_is_five_newest() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    let cookie = check(&app, None, "submission #1 vaccine").await.cookie.unwrap();
    for i in 2..=6 {
        let reply = check(&app, Some(&cookie), &format!("submission #{} vaccine", i)).await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    let history = send(&app, "GET", "/api/v1/history", Some(&cookie), None).await;
    let texts: Vec<&str> = history.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["text"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec![
            "submission #6 vaccine",
            "submission #5 vaccine",
            "submission #4 vaccine",
            "submission #3 vaccine",
            "submission #2 vaccine",
        ]
    );
    assert_eq!(history.body["stored"], 6);
    assert_eq!(history.body["items"][0]["preview"], "submission #6 vaccine...");
}

#[tokio::test]
async fn test_end_session_drops_history() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    let cookie = check(&app, None, "Scientists confirm vaccine safety").await.cookie.unwrap();

    let ended = send(&app, "DELETE", "/api/v1/session", Some(&cookie), None).await;
    assert_eq!(ended.status, StatusCode::NO_CONTENT);

    let history = send(&app, "GET", "/api/v1/history", Some(&cookie), None).await;
    assert_eq!(history.status, StatusCode::OK);
    assert!(history.body["items"].as_array().unwrap().is_empty());
    assert!(history.cookie.is_none());

    let again = check(&app, Some(&cookie), "Aliens built the pyramids").await;
    assert!(again.cookie.is_some());
    assert_ne!(again.cookie.unwrap(), cookie);
}

#[tokio::test]
async fn test_only_checks_start_sessions() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    for (method, uri) in [("GET", "/"), ("GET", "/api/v1/history"), ("DELETE", "/api/v1/session")] {
        let reply = send(&app, method, uri, None, None).await;
        assert!(reply.status.is_success(), "{} {}", method, uri);
        assert!(reply.cookie.is_none() || uri == "/api/v1/session", "{} {}", method, uri);
    }

    let status = send(&app, "GET", "/api/v1/status", None, None).await;
    assert_eq!(status.body["active_sessions"], 0);

    check(&app, None, "Scientists confirm vaccine safety").await;
    let status = send(&app, "GET", "/api/v1/status", None, None).await;
    assert_eq!(status.body["active_sessions"], 1);
}

#[tokio::test]
async fn test_inference_failure_keeps_history() {
    let app = flaky_app();

    let ok = check(&app, None, "Scientists confirm vaccine safety").await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["result"]["label"], "REAL");
    let cookie = ok.cookie.unwrap();

    let failed = check(&app, Some(&cookie), "garbled wire copy").await;
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failed.body["code"], "inference_failed");
    assert_eq!(failed.body["severity"], "error");

    let history = send(&app, "GET", "/api/v1/history", Some(&cookie), None).await;
    let items = history.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "Scientists confirm vaccine safety");
    assert_eq!(history.body["total_checked"], 1);
}

#[tokio::test]
async fn test_oversized_text_rejected() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let app = app_for(dir.path());

    let reply = check(&app, None, &"word ".repeat(25_000)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "validation_error");
}

#[tokio::test]
async fn test_index_page_served() {
    let dir = tempdir().unwrap();
    let app = app_for(dir.path());

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Check Authenticity"));
}
