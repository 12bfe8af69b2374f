use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Origin of the web app; approval deep links are rooted here.
    pub app_origin: String,
    /// IANA timezone the community lives in. Ride date+time fields are
    /// interpreted in this zone when computing the departure instant.
    pub community_timezone: String,
    /// Only identities under this email domain may use the service.
    pub allowed_email_domain: String,
    /// Ed25519 public key (PEM) of the external identity provider.
    pub identity_public_key: String,
    pub identity_audience: String,
    /// HMAC secret for approval capability tokens.
    pub approval_token_secret: String,
    pub approval_token_ttl_days: i64,
    pub mail_service_url: String,
    pub mail_service_token: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            app_origin: env::var("APP_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            community_timezone: env::var("COMMUNITY_TIMEZONE").unwrap_or_else(|_| "Asia/Kolkata".to_string()),
            allowed_email_domain: env::var("ALLOWED_EMAIL_DOMAIN").expect("ALLOWED_EMAIL_DOMAIN must be set"),
            identity_public_key: env::var("IDENTITY_PUBLIC_KEY").expect("IDENTITY_PUBLIC_KEY must be set (Ed25519 Public Key PEM)"),
            identity_audience: env::var("IDENTITY_AUDIENCE").unwrap_or_else(|_| "carpool-frontend".to_string()),
            approval_token_secret: env::var("APPROVAL_TOKEN_SECRET").expect("APPROVAL_TOKEN_SECRET must be set"),
            approval_token_ttl_days: env::var("APPROVAL_TOKEN_TTL_DAYS").unwrap_or_else(|_| "14".to_string()).parse().expect("APPROVAL_TOKEN_TTL_DAYS must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
        }
    }
}
