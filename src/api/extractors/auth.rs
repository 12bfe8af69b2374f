use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Span;

use crate::state::AppState;

/// Claims minted by the external identity provider. The service never
/// authenticates anyone itself; it only verifies this assertion and compares
/// emails for equality downstream.
#[derive(Debug, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub aud: String,
    pub exp: usize,
}

/// The verified caller: community email plus a display name fallback.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub email: String,
    pub name: String,
}

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.identity_public_key.as_bytes())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[app_state.config.identity_audience.as_str()]);

        let token_data = decode::<IdentityClaims>(bearer, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let claims = token_data.claims;

        // Closed community: anything outside the configured domain is shut
        // out regardless of how valid the token is.
        let suffix = format!("@{}", app_state.config.allowed_email_domain);
        if !claims.email.ends_with(&suffix) {
            return Err(StatusCode::FORBIDDEN);
        }

        let name = claims
            .name
            .unwrap_or_else(|| claims.email.split('@').next().unwrap_or("member").to_string());

        Span::current().record("user_email", claims.email.as_str());

        Ok(AuthIdentity {
            email: claims.email,
            name,
        })
    }
}
