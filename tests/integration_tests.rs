//! # Integration tests
//!
//! Drive the full axum router in-process with `tower::ServiceExt::oneshot`.
//! Time is controlled with [`ManualClock`] and audit output is captured with
//! [`RecordingAuditSink`].
//!
//! ```bash
//! cargo test --test integration_tests
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shorturl::{
    api::create_router,
    audit::RecordingAuditSink,
    config::{Config, ConfigBuilder},
    services::{AppState, CodeGenerator, RandomCodeGenerator, ShortenerService},
    utils::{Clock, ManualClock},
};
use tower::ServiceExt;

// =====================================
// Helpers
// =====================================
struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
    audit: Arc<RecordingAuditSink>,
    state: AppState,
}

fn test_config() -> Config {
    ConfigBuilder::new()
        .public_base_url("http://localhost:8000")
        .build()
}

fn spawn_app_with(config: Config, generator: Option<Arc<dyn CodeGenerator>>) -> TestApp {
    let clock = Arc::new(ManualClock::default());
    let audit = Arc::new(RecordingAuditSink::new());

    let mut shortener = ShortenerService::new(&config, audit.clone()).with_clock(clock.clone());
    if let Some(generator) = generator {
        shortener = shortener.with_generator(generator);
    }

    let state = AppState::from_parts(config, shortener, audit.clone());
    TestApp {
        router: create_router(state.clone()),
        clock,
        audit,
        state,
    }
}

fn spawn_app() -> TestApp {
    spawn_app_with(test_config(), None)
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn create(&self, body: Value) -> Response<Body> {
        self.send(post_json("/shorturls", &body.to_string())).await
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Always returns the same code.
struct FixedGenerator(&'static str);

impl CodeGenerator for FixedGenerator {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

// =====================================
// Lifecycle
// =====================================
mod lifecycle_tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_redirect_expire_stats() {
        let app = spawn_app();

        let response = app
            .create(json!({ "url": "https://example.com", "validity": 1, "shortcode": "abcd" }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["shortlink"], "http://localhost:8000/abcd");
        let expiry: DateTime<Utc> = serde_json::from_value(created["expiry"].clone()).unwrap();
        assert_eq!(expiry, app.clock.now() + Duration::minutes(1));

        let response = app
            .send(
                Request::get("/abcd")
                    .header(header::REFERER, "https://news.example")
                    .header("X-Forwarded-For", "203.0.113.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://example.com/");

        app.clock.advance(Duration::minutes(1) + Duration::milliseconds(1));

        let response = app.get("/abcd").await;
        assert_eq!(response.status(), StatusCode::GONE);

        let response = app.get("/shorturls/abcd").await;
        assert_eq!(response.status(), StatusCode::OK);
        let stats = body_json(response).await;
        assert_eq!(stats["original_url"], "https://example.com/");
        assert_eq!(stats["total_clicks"], 1);
        assert_eq!(stats["click_details"].as_array().unwrap().len(), 1);
        assert_eq!(stats["click_details"][0]["referrer"], "https://news.example");
        assert_eq!(stats["click_details"][0]["location"], "203.0.113.9");
    }

    #[tokio::test]
    async fn test_url_with_control_characters_redirects_cleanly() {
        let app = spawn_app();

        let response = app
            .create(json!({ "url": "https://example.com/a\nb", "shortcode": "ctl1" }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let router = app.router.clone();
        let redirect = tokio::spawn(async move {
            router
                .oneshot(Request::get("/ctl1").body(Body::empty()).unwrap())
                .await
                .unwrap()
        })
        .await
        .expect("redirect handler panicked");

        assert_eq!(redirect.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(redirect.headers()[header::LOCATION], "https://example.com/ab");
        assert_eq!(app.state.shortener.click_count("ctl1"), 1);
    }

    #[tokio::test]
    async fn test_generated_shortcode_and_default_validity() {
        let app = spawn_app();

        let response = app.create(json!({ "url": "https://example.com/a/long/path" })).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        let shortlink = created["shortlink"].as_str().unwrap();
        let code = shortlink.rsplit('/').next().unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));

        let expiry: DateTime<Utc> = serde_json::from_value(created["expiry"].clone()).unwrap();
        assert_eq!(expiry, app.clock.now() + Duration::minutes(30));

        let response = app.get(&format!("/{code}")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_shortlink_uses_request_host_without_base_url() {
        let app = spawn_app_with(ConfigBuilder::new().build(), None);

        let request = Request::post("/shorturls")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::HOST, "sho.rt")
            .body(Body::from(json!({ "url": "https://example.com", "shortcode": "host1" }).to_string()))
            .unwrap();

        let created = body_json(app.send(request).await).await;
        assert_eq!(created["shortlink"], "http://sho.rt/host1");
    }

    #[tokio::test]
    async fn test_redirect_without_client_info_records_unknown_location() {
        let app = spawn_app();
        app.create(json!({ "url": "https://example.com", "shortcode": "anon" })).await;

        app.get("/anon").await;

        let stats = body_json(app.get("/shorturls/anon").await).await;
        assert_eq!(stats["click_details"][0]["location"], "unknown");
        assert_eq!(stats["click_details"][0]["referrer"], Value::Null);
    }
}

// =====================================
// Error mapping
// =====================================
mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_duplicate_shortcode_conflicts() {
        let app = spawn_app();

        let first = app.create(json!({ "url": "https://example.com", "shortcode": "dup1" })).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.create(json!({ "url": "https://other.com", "shortcode": "dup1" })).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let body = body_json(second).await;
        assert_eq!(body["status_code"], 409);
        assert!(body["message"].as_str().unwrap().contains("dup1"));
    }

    #[tokio::test]
    async fn test_unknown_shortcode_is_not_found() {
        let app = spawn_app();

        assert_eq!(app.get("/shorturls/nope").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.get("/nope").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_bodies_are_unprocessable() {
        let app = spawn_app();

        for body in [
            json!({ "url": "not a url" }),
            json!({ "url": "ftp://example.com/file" }),
            json!({ "url": "https://example.com", "validity": 0 }),
            json!({ "url": "https://example.com", "validity": -10 }),
            json!({ "url": "https://example.com", "shortcode": "ab" }),
            json!({ "url": "https://example.com", "shortcode": "way-too-long-code" }),
            json!({ "url": "https://example.com", "shortcode": "bad code" }),
            json!({ "url": "https://example.com", "shortcode": "health" }),
            json!({ "validity": 5 }),
        ] {
            let response = app.create(body.clone()).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        }

        assert_eq!(app.state.shortener.total_shortcodes(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_unprocessable() {
        let app = spawn_app();

        let response = app.send(post_json("/shorturls", "{ not json")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_generator_exhaustion_hides_detail() {
        let config = ConfigBuilder::new()
            .public_base_url("http://localhost:8000")
            .max_generation_attempts(3)
            .build();
        let app = spawn_app_with(config, Some(Arc::new(FixedGenerator("same1234"))));

        let first = app.create(json!({ "url": "https://example.com" })).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.create(json!({ "url": "https://example.com" })).await;
        assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(second).await;
        assert_eq!(body["message"], "Internal server error");
    }
}

// =====================================
// Concurrency
// =====================================
mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redirects_count_every_click() {
        let app = spawn_app();
        app.create(json!({ "url": "https://example.com", "shortcode": "busy" })).await;

        const N: usize = 200;
        let handles: Vec<_> = (0..N)
            .map(|_| {
                let router = app.router.clone();
                tokio::spawn(async move {
                    router
                        .oneshot(Request::get("/busy").body(Body::empty()).unwrap())
                        .await
                        .unwrap()
                        .status()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::TEMPORARY_REDIRECT);
        }

        assert_eq!(app.state.shortener.click_count("busy"), N);
        let stats = body_json(app.get("/shorturls/busy").await).await;
        assert_eq!(stats["total_clicks"], N);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_have_one_winner() {
        let app = spawn_app();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let router = app.router.clone();
                let body = json!({ "url": format!("https://example.com/{i}"), "shortcode": "race" });
                tokio::spawn(async move {
                    router
                        .oneshot(post_json("/shorturls", &body.to_string()))
                        .await
                        .unwrap()
                        .status()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::CREATED => created += 1,
                StatusCode::CONFLICT => {}
                other => panic!("unexpected status {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(app.state.shortener.total_shortcodes(), 1);
    }
}

// =====================================
// Ambient behaviour
// =====================================
mod ambient_tests {
    use super::*;
    use shorturl::audit::{Level, Package};

    #[tokio::test]
    async fn test_health_reports_shortcode_count() {
        let app = spawn_app();
        app.create(json!({ "url": "https://example.com", "shortcode": "one1" })).await;

        let response = app.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["total_shortcodes"], 1);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed_or_minted() {
        let app = spawn_app();

        let minted = app.get("/health").await;
        assert!(minted.headers().contains_key("X-Request-Id"));

        let echoed = app
            .send(
                Request::get("/health")
                    .header("X-Request-Id", "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(echoed.headers()["X-Request-Id"], "trace-me");
    }

    #[tokio::test]
    async fn test_unreachable_audit_collector_changes_nothing() {
        let config = ConfigBuilder::new()
            .public_base_url("http://localhost:8000")
            .audit_endpoint("http://127.0.0.1:9/logs")
            .audit_timeout_ms(50)
            .build();
        let router = create_router(AppState::new(config));

        let created = router
            .clone()
            .oneshot(post_json(
                "/shorturls",
                &json!({ "url": "https://example.com", "shortcode": "lost" }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let redirect = router
            .oneshot(Request::get("/lost").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(redirect.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_requests_are_audited() {
        let app = spawn_app();
        app.create(json!({ "url": "https://example.com", "shortcode": "aud1" })).await;
        app.get("/aud1").await;

        let messages = app.audit.messages();
        assert!(messages
            .iter()
            .any(|m| m == "Created short URL: http://localhost:8000/aud1 -> https://example.com/"));
        assert!(messages.iter().any(|m| m == "Redirecting: aud1 -> https://example.com/"));
        assert!(messages.iter().any(|m| m.starts_with("POST /shorturls - 201 - ")));
        assert!(messages.iter().any(|m| m.starts_with("GET /aud1 - 307 - ")));

        assert!(app
            .audit
            .events()
            .iter()
            .all(|e| e.level == Level::Info && matches!(e.package, Package::Service | Package::Route)));
    }
}

// =====================================
// Properties
// =====================================
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use shorturl::{error::AppError, models::CreateShortUrlRequest, utils};

    const ORIGIN: &str = "http://localhost:8000";

    proptest! {
        #[test]
        fn prop_valid_custom_codes_are_accepted(code in "[a-zA-Z0-9_-]{4,10}") {
            prop_assume!(!utils::is_reserved_short_code(&code));
            let app = spawn_app();

            let created = app
                .state
                .shortener
                .create(CreateShortUrlRequest::new("https://example.com").shortcode(code.clone()), ORIGIN)
                .unwrap();

            prop_assert_eq!(created.shortlink, format!("{ORIGIN}/{code}"));
        }

        #[test]
        fn prop_codes_with_other_characters_are_rejected(
            prefix in "[a-z]{2}",
            bad in "[^a-zA-Z0-9_-]",
            suffix in "[a-z]{2}",
        ) {
            let code = format!("{prefix}{bad}{suffix}");
            let app = spawn_app();

            let result = app
                .state
                .shortener
                .create(CreateShortUrlRequest::new("https://example.com").shortcode(code), ORIGIN);

            prop_assert!(matches!(result, Err(AppError::Validation(_))));
        }

        #[test]
        fn prop_validity_sets_expiry(minutes in 1i64..=525_600) {
            let app = spawn_app();

            let created = app
                .state
                .shortener
                .create(CreateShortUrlRequest::new("https://example.com").validity(minutes), ORIGIN)
                .unwrap();

            prop_assert_eq!(created.expiry, app.clock.now() + chrono::Duration::minutes(minutes));
        }

        #[test]
        fn prop_generated_codes_match_alphabet(_seed in 0u8..32) {
            let code = RandomCodeGenerator::default().generate();
            prop_assert_eq!(code.len(), utils::DEFAULT_SHORT_CODE_LENGTH);
            prop_assert!(code.bytes().all(|b| utils::SHORT_CODE_CHARS.contains(&b)));
        }
    }
}
