use std::sync::Arc;
use std::str::FromStr;

use crate::domain::models::{
    request::{DecisionAction, RideRequest, STATE_APPROVED, STATE_PENDING, STATE_WITHDRAWN},
    ride::Ride,
};
use crate::domain::ports::{RideRepository, RideRequestRepository};
use crate::domain::services::{approval_token::ApprovalTokenService, dispatcher::NotificationDispatcher};
use crate::error::AppError;
use tracing::info;

pub struct CreatedRequest {
    pub request: RideRequest,
    pub approve_link: String,
    pub reject_link: String,
    pub whatsapp_link: String,
}

pub struct RedeemOutcome {
    pub request: RideRequest,
    pub message: String,
    pub passenger_phone: Option<String>,
}

/// Owns the request state machine. Every decision — same-session or
/// deep-link — funnels through `decide`, so the authorization and
/// idempotency guards live in exactly one place.
pub struct RequestLedger {
    rides: Arc<dyn RideRepository>,
    requests: Arc<dyn RideRequestRepository>,
    tokens: Arc<ApprovalTokenService>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl RequestLedger {
    pub fn new(
        rides: Arc<dyn RideRepository>,
        requests: Arc<dyn RideRequestRepository>,
        tokens: Arc<ApprovalTokenService>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            rides,
            requests,
            tokens,
            dispatcher,
        }
    }

    pub async fn create_request(
        &self,
        ride_id: &str,
        passenger_email: &str,
        passenger_name: &str,
        passenger_phone: &str,
    ) -> Result<CreatedRequest, AppError> {
        let ride = self
            .rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".into()))?;

        if ride.host_email == passenger_email {
            return Err(AppError::SelfRequest);
        }
        if !ride.is_active() {
            return Err(AppError::RideNotActive);
        }
        // Fast fail. Availability is re-checked both in the insert
        // transaction and again at approval time.
        if ride.seats_available <= 0 {
            return Err(AppError::NoSeatsAvailable);
        }

        let request = RideRequest::new(
            ride.id.clone(),
            passenger_email.to_string(),
            passenger_name.to_string(),
            passenger_phone.to_string(),
        );
        let created = self.requests.create(&request).await?;

        let token = self.tokens.issue(&created.id, &ride.id, &ride.host_email)?;
        info!("Request {} created on ride {}", created.id, ride.id);

        self.dispatcher.request_received(&ride, &created, &token).await;

        Ok(CreatedRequest {
            approve_link: self
                .dispatcher
                .host_deep_link(&created.id, DecisionAction::Approve, &token),
            reject_link: self
                .dispatcher
                .host_deep_link(&created.id, DecisionAction::Reject, &token),
            whatsapp_link: self.dispatcher.whatsapp_link(&ride.contact_number, &ride),
            request: created,
        })
    }

    /// Unified decision entry point. `actor_email` is the verified identity
    /// of the caller, whether it arrived with a session or a redeemed token.
    /// A withdrawn request reports `RideNotActive` (the ride was cancelled
    /// under the host), while any other non-pending state is `AlreadyDecided`.
    pub async fn decide(
        &self,
        request_id: &str,
        action: DecisionAction,
        actor_email: &str,
    ) -> Result<(Ride, RideRequest), AppError> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".into()))?;

        let ride = self
            .rides
            .find_by_id(&request.ride_id)
            .await?
            .ok_or(AppError::Internal)?;

        if ride.host_email != actor_email {
            return Err(AppError::Unauthorized);
        }
        // A withdrawn request means the ride was cancelled under us; that
        // reads as "ride gone", not as a replayed decision.
        if request.state == STATE_WITHDRAWN {
            return Err(AppError::RideNotActive);
        }
        if request.state != STATE_PENDING {
            return Err(AppError::AlreadyDecided);
        }
        if !ride.is_active() {
            return Err(AppError::RideNotActive);
        }

        let decided = match action {
            // The repository call re-runs every guard under the ride's
            // transaction; a lost seat race surfaces as NoSeatsAvailable
            // with the request still pending.
            DecisionAction::Approve => self.requests.approve_pending(&request.id).await?,
            DecisionAction::Reject => self.requests.reject_pending(&request.id).await?,
        };
        info!("Request {} {} by {}", decided.id, decided.state, actor_email);

        // Re-read for the post-decision seat count.
        let ride = self
            .rides
            .find_by_id(&request.ride_id)
            .await?
            .ok_or(AppError::Internal)?;

        self.dispatcher.request_decided(&ride, &decided).await;

        Ok((ride, decided))
    }

    /// Deep-link redemption: verify the capability token, require the caller
    /// to be the host it names, then run the ordinary decision path.
    pub async fn redeem(
        &self,
        request_id: &str,
        action: &str,
        token: &str,
        actor_email: &str,
    ) -> Result<RedeemOutcome, AppError> {
        let action = DecisionAction::from_str(action)?;
        let claims = self.tokens.verify(token)?;

        // Opaque on purpose: neither a host mismatch nor a token bound to a
        // different request reveals anything about the token or the request.
        if claims.host != actor_email || claims.sub != request_id {
            return Err(AppError::Unauthorized);
        }

        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".into()))?;
        if request.ride_id != claims.ride {
            return Err(AppError::Unauthorized);
        }

        let (_, decided) = self.decide(request_id, action, actor_email).await?;

        let approved = decided.state == STATE_APPROVED;
        Ok(RedeemOutcome {
            message: if approved {
                format!("Approved {}'s request", decided.passenger_name)
            } else {
                format!("Rejected {}'s request", decided.passenger_name)
            },
            passenger_phone: approved.then(|| decided.passenger_phone.clone()),
            request: decided,
        })
    }

    pub async fn cancel_ride(
        &self,
        ride_id: &str,
        actor_email: &str,
    ) -> Result<(Ride, Vec<RideRequest>), AppError> {
        let ride = self
            .rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".into()))?;

        if ride.host_email != actor_email {
            return Err(AppError::Unauthorized);
        }

        let (cancelled, affected) = self.rides.cancel_cascade(ride_id).await?;
        info!(
            "Ride {} cancelled, {} request(s) withdrawn",
            cancelled.id,
            affected.len()
        );

        self.dispatcher.ride_cancelled(&cancelled, &affected).await;

        Ok((cancelled, affected))
    }
}
