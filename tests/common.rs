use carpool_backend::{
    api::router::create_router,
    config::Config,
    domain::ports::EmailService,
    error::AppError,
    infra::factory::assemble,
    infra::repositories::{
        sqlite_notification_repo::SqliteNotificationRepo, sqlite_request_repo::SqliteRequestRepo,
        sqlite_ride_repo::SqliteRideRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tera::Tera;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_DOMAIN: &str = "example.edu";
pub const APPROVAL_SECRET: &str = "test-approval-secret";

pub struct MockEmailService;

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        _recipient: &str,
        _subject: &str,
        _html_body: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        // Single connection, matching the production SQLite setup.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut tera = Tera::default();
        tera.add_raw_template(
            "request_alert.html",
            "<html>Mock alert for {{ host_name }}: {{ approve_link }} {{ reject_link }}</html>",
        )
        .unwrap();
        tera.add_raw_template(
            "request_decided.html",
            "<html>Mock decision for {{ passenger_name }}</html>",
        )
        .unwrap();
        let templates = Arc::new(tera);

        let pub_key_pem = include_str!("keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            app_origin: "http://localhost:3000".to_string(),
            community_timezone: "UTC".to_string(),
            allowed_email_domain: TEST_DOMAIN.to_string(),
            identity_public_key: pub_key_pem.to_string(),
            identity_audience: "carpool-frontend".to_string(),
            approval_token_secret: APPROVAL_SECRET.to_string(),
            approval_token_ttl_days: 14,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
        };

        let state = Arc::new(assemble(
            &config,
            templates,
            Arc::new(MockEmailService),
            Arc::new(SqliteRideRepo::new(pool.clone())),
            Arc::new(SqliteRequestRepo::new(pool.clone())),
            Arc::new(SqliteNotificationRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Mint an identity-provider JWT the way the external provider would.
    pub fn identity_token(&self, email: &str, name: &str) -> String {
        let priv_key_pem = include_str!("keys/test_private.pem");
        let key = EncodingKey::from_ed_pem(priv_key_pem.as_bytes()).unwrap();
        let now = Utc::now();

        let claims = serde_json::json!({
            "sub": email,
            "email": email,
            "name": name,
            "aud": "carpool-frontend",
            "iat": now.timestamp(),
            "exp": (now + chrono::Duration::hours(1)).timestamp(),
        });

        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn delete(&self, uri: &str, token: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Post a ride as `host` departing comfortably in the future; returns its id.
#[allow(dead_code)]
pub async fn post_ride(app: &TestApp, host_token: &str, seats: i64) -> String {
    let date = (Utc::now() + chrono::Duration::days(7))
        .format("%Y-%m-%d")
        .to_string();
    let res = app
        .post(
            "/api/v1/rides",
            host_token,
            serde_json::json!({
                "origin": "Campus",
                "destination": "Airport",
                "date": date,
                "time": "09:30",
                "seats_total": seats,
                "contact_number": "+911234567890"
            }),
        )
        .await;
    assert!(res.status().is_success(), "ride creation failed: {}", res.status());
    let body = parse_body(res).await;
    body["id"].as_str().unwrap().to_string()
}

/// Request a seat on `ride_id` as the given passenger; returns the body
/// (request + deep links).
#[allow(dead_code)]
pub async fn join_ride(app: &TestApp, passenger_token: &str, ride_id: &str) -> Value {
    let res = app
        .post(
            &format!("/api/v1/rides/{}/requests", ride_id),
            passenger_token,
            serde_json::json!({ "passenger_phone": "+919876543210" }),
        )
        .await;
    assert!(res.status().is_success(), "join failed: {}", res.status());
    parse_body(res).await
}
