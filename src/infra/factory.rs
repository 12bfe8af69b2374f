use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use tera::Tera;
use tracing::info;

use crate::config::Config;
use crate::domain::ports::{
    EmailService, NotificationRepository, RideRepository, RideRequestRepository,
};
use crate::domain::services::{
    approval_token::ApprovalTokenService, dispatcher::NotificationDispatcher,
    ledger::RequestLedger,
};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::repositories::{
    postgres_notification_repo::PostgresNotificationRepo,
    postgres_request_repo::PostgresRequestRepo, postgres_ride_repo::PostgresRideRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_request_repo::SqliteRequestRepo,
    sqlite_ride_repo::SqliteRideRepo,
};
use crate::state::AppState;

pub fn load_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("request_alert.html", include_str!("../templates/request_alert.html"))
        .expect("Failed to load request_alert template");
    tera.add_raw_template("request_decided.html", include_str!("../templates/request_decided.html"))
        .expect("Failed to load request_decided template");
    Arc::new(tera)
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let email_service: Arc<dyn EmailService> = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));
    let templates = load_templates();

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble(
            config,
            templates,
            email_service,
            Arc::new(PostgresRideRepo::new(pool.clone())),
            Arc::new(PostgresRequestRepo::new(pool.clone())),
            Arc::new(PostgresNotificationRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite URL")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        // A single connection: SQLite gets one writer anyway, and the seat
        // transactions must never observe a stale snapshot mid-race.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble(
            config,
            templates,
            email_service,
            Arc::new(SqliteRideRepo::new(pool.clone())),
            Arc::new(SqliteRequestRepo::new(pool.clone())),
            Arc::new(SqliteNotificationRepo::new(pool)),
        )
    }
}

pub fn assemble(
    config: &Config,
    templates: Arc<Tera>,
    email_service: Arc<dyn EmailService>,
    ride_repo: Arc<dyn RideRepository>,
    request_repo: Arc<dyn RideRequestRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
) -> AppState {
    let approval_tokens = Arc::new(ApprovalTokenService::new(
        &config.approval_token_secret,
        config.approval_token_ttl_days,
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        notification_repo.clone(),
        email_service.clone(),
        templates.clone(),
        config.app_origin.clone(),
    ));
    let ledger = Arc::new(RequestLedger::new(
        ride_repo.clone(),
        request_repo.clone(),
        approval_tokens.clone(),
        dispatcher.clone(),
    ));

    AppState {
        config: config.clone(),
        ride_repo,
        request_repo,
        notification_repo,
        email_service,
        approval_tokens,
        dispatcher,
        ledger,
        templates,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
