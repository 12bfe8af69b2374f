use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an approval capability token. The token binds a single
/// request to its ride and host; the approve/reject action is supplied as a
/// separate parameter at redemption time.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApprovalClaims {
    /// Request id.
    pub sub: String,
    /// Ride id.
    pub ride: String,
    /// Host email the redeemer must authenticate as.
    pub host: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the signed tokens embedded in host-facing deep links,
/// so a host can act on a request without an active session. Verification is
/// stateless; live request state is re-checked by the ledger afterwards.
pub struct ApprovalTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl ApprovalTokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(
        &self,
        request_id: &str,
        ride_id: &str,
        host_email: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = ApprovalClaims {
            sub: request_id.to_string(),
            ride: ride_id.to_string(),
            host: host_email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Approval token encoding failed: {}", e);
            AppError::Internal
        })
    }

    /// Checks signature and expiry only. Authorization (host identity match)
    /// and liveness (request still pending) are layered on top by the caller.
    pub fn verify(&self, token: &str) -> Result<ApprovalClaims, AppError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<ApprovalClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_recovers_bindings() {
        let svc = ApprovalTokenService::new("secret-a", 14);
        let token = svc.issue("req-1", "ride-1", "host@example.edu").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "req-1");
        assert_eq!(claims.ride, "ride-1");
        assert_eq!(claims.host, "host@example.edu");
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let issuer = ApprovalTokenService::new("secret-a", 14);
        let verifier = ApprovalTokenService::new("secret-b", 14);
        let token = issuer.issue("req-1", "ride-1", "host@example.edu").unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let svc = ApprovalTokenService::new("secret-a", 14);
        let mut token = svc.issue("req-1", "ride-1", "host@example.edu").unwrap();
        token.push('x');
        assert!(matches!(svc.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let svc = ApprovalTokenService::new("secret-a", -1);
        let token = svc.issue("req-1", "ride-1", "host@example.edu").unwrap();
        assert!(matches!(svc.verify(&token), Err(AppError::TokenExpired)));
    }
}
