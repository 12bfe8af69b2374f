use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::dtos::requests::{JoinRideRequest, RedeemRequest, RespondRequest};
use crate::api::dtos::responses::{CreatedRequestResponse, RedeemResponse};
use crate::api::extractors::auth::AuthIdentity;
use crate::domain::models::request::DecisionAction;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Path(ride_id): Path<String>,
    Json(payload): Json<JoinRideRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.passenger_phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("passenger_phone must contain digits".into()));
    }

    let created = state
        .ledger
        .create_request(
            &ride_id,
            &identity.email,
            payload.passenger_name.as_deref().unwrap_or(&identity.name),
            payload.passenger_phone.trim(),
        )
        .await?;

    Ok(Json(CreatedRequestResponse {
        request: created.request,
        approve_link: created.approve_link,
        reject_link: created.reject_link,
        whatsapp_link: created.whatsapp_link,
    }))
}

/// Same-session decision path: the host is logged in and acts from the app.
pub async fn respond(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Path(request_id): Path<String>,
    Json(payload): Json<RespondRequest>,
) -> Result<impl IntoResponse, AppError> {
    let action = DecisionAction::from_str(&payload.action)?;
    let (_, decided) = state
        .ledger
        .decide(&request_id, action, &identity.email)
        .await?;
    Ok(Json(decided))
}

/// Deep-link redemption path: the host followed an emailed link. The token
/// authorizes the action; the caller must still present a verified identity.
pub async fn redeem(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Json(payload): Json<RedeemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .ledger
        .redeem(
            &payload.request_id,
            &payload.action,
            &payload.token,
            &identity.email,
        )
        .await?;

    Ok(Json(RedeemResponse {
        message: outcome.message,
        passenger_phone: outcome.passenger_phone,
    }))
}
