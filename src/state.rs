use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    EmailService, NotificationRepository, RideRepository, RideRequestRepository,
};
use crate::domain::services::{
    approval_token::ApprovalTokenService, dispatcher::NotificationDispatcher,
    ledger::RequestLedger,
};
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub ride_repo: Arc<dyn RideRepository>,
    pub request_repo: Arc<dyn RideRequestRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub email_service: Arc<dyn EmailService>,
    pub approval_tokens: Arc<ApprovalTokenService>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub ledger: Arc<RequestLedger>,
    pub templates: Arc<Tera>,
}
