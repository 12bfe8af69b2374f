use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateRideRequest;
use crate::api::dtos::responses::{HostedRideResponse, RideResponse};
use crate::api::extractors::auth::AuthIdentity;
use crate::domain::models::ride::{NewRideParams, Ride};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_ride(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Json(payload): Json<CreateRideRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.seats_total < 1 {
        return Err(AppError::Validation("seats_total must be at least 1".into()));
    }
    if payload.origin.trim().is_empty() || payload.destination.trim().is_empty() {
        return Err(AppError::Validation("origin and destination are required".into()));
    }
    // The number also feeds the wa.me link, which is digits-only.
    if !payload.contact_number.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("contact_number must contain digits".into()));
    }

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;
    let time = NaiveTime::parse_from_str(&payload.time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    let tz: Tz = state
        .config
        .community_timezone
        .parse()
        .unwrap_or(chrono_tz::UTC);
    let depart_at = tz
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(AppError::Validation(
            "Invalid local time (ambiguous or skipped due to DST)".into(),
        ))?
        .with_timezone(&Utc);

    if depart_at < Utc::now() {
        return Err(AppError::Validation("Departure must be in the future".into()));
    }

    let ride = Ride::new(NewRideParams {
        host_email: identity.email.clone(),
        host_name: payload.host_name.unwrap_or(identity.name),
        origin: payload.origin,
        destination: payload.destination,
        date,
        time,
        depart_at,
        contact_number: payload.contact_number,
        seats_total: payload.seats_total,
    });

    let created = state.ride_repo.create(&ride).await?;
    info!("Ride {} posted by {}", created.id, created.host_email);

    Ok(Json(RideResponse::new(created, &[])))
}

pub async fn list_rides(
    State(state): State<Arc<AppState>>,
    _identity: AuthIdentity,
) -> Result<impl IntoResponse, AppError> {
    let rides = state.ride_repo.list_active(Utc::now()).await?;

    let mut out = Vec::with_capacity(rides.len());
    for ride in rides {
        let requests = state.request_repo.list_by_ride(&ride.id).await?;
        out.push(RideResponse::new(ride, &requests));
    }
    Ok(Json(out))
}

pub async fn get_ride(
    State(state): State<Arc<AppState>>,
    _identity: AuthIdentity,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state
        .ride_repo
        .find_by_id(&ride_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".into()))?;
    let requests = state.request_repo.list_by_ride(&ride.id).await?;
    Ok(Json(RideResponse::new(ride, &requests)))
}

pub async fn list_my_rides(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
) -> Result<impl IntoResponse, AppError> {
    let rides = state.ride_repo.list_by_host(&identity.email).await?;

    let mut out = Vec::with_capacity(rides.len());
    for ride in rides {
        let requests = state.request_repo.list_by_ride(&ride.id).await?;
        out.push(HostedRideResponse { ride, requests });
    }
    Ok(Json(out))
}

/// Request list for a ride; hosts only.
pub async fn list_ride_requests(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state
        .ride_repo
        .find_by_id(&ride_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".into()))?;
    if ride.host_email != identity.email {
        return Err(AppError::Unauthorized);
    }

    let requests = state.request_repo.list_by_ride(&ride.id).await?;
    Ok(Json(requests))
}

pub async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (cancelled, _) = state.ledger.cancel_ride(&ride_id, &identity.email).await?;
    Ok(Json(cancelled))
}
