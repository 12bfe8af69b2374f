use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::extractors::auth::AuthIdentity;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state
        .notification_repo
        .list_by_owner(&identity.email)
        .await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Path(notification_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .notification_repo
        .mark_read(&identity.email, &notification_id)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    identity: AuthIdentity,
    Path(notification_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .notification_repo
        .delete(&identity.email, &notification_id)
        .await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
