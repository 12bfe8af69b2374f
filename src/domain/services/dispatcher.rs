use std::sync::Arc;

use crate::domain::models::{
    notification::{
        Notification, KIND_NEW_REQUEST, KIND_REQUEST_APPROVED, KIND_REQUEST_REJECTED,
        KIND_RIDE_CANCELLED,
    },
    request::{DecisionAction, RideRequest, STATE_APPROVED},
    ride::Ride,
};
use crate::domain::ports::{EmailService, NotificationRepository};
use tera::{Context, Tera};
use tracing::warn;

/// Turns lifecycle events into notification rows and outbound message
/// content. Everything here is best-effort: a failed insert or send is
/// logged and never propagates into the state transition it describes.
/// Actual delivery is the mail relay's problem; this only produces content.
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationRepository>,
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    app_origin: String,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        email: Arc<dyn EmailService>,
        templates: Arc<Tera>,
        app_origin: String,
    ) -> Self {
        Self {
            notifications,
            email,
            templates,
            app_origin,
        }
    }

    /// Deep link a host can open from an external channel to act on a
    /// request without a session. The token authorizes; the action is a
    /// plain query parameter.
    pub fn host_deep_link(&self, request_id: &str, action: DecisionAction, token: &str) -> String {
        format!(
            "{}/?approve_request={}&action={}&token={}",
            self.app_origin, request_id, action, token
        )
    }

    /// Click-to-chat handoff for contacting the other party on WhatsApp.
    pub fn whatsapp_link(&self, phone: &str, ride: &Ride) -> String {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        let message = format!(
            "Hi! I'm interested in your ride from {} to {} on {}",
            ride.origin, ride.destination, ride.date
        );
        format!("https://wa.me/{}?text={}", digits, urlencoding::encode(&message))
    }

    /// New request: notify the host and mail them the approve/reject links.
    pub async fn request_received(&self, ride: &Ride, request: &RideRequest, token: &str) {
        let title = format!("New request for {} → {}", ride.origin, ride.destination);
        let message = format!(
            "{} ({}) wants to join your ride on {} at {}.",
            request.passenger_name, request.passenger_email, ride.date, ride.time
        );
        self.store(Notification::new(
            ride.host_email.clone(),
            KIND_NEW_REQUEST,
            title.clone(),
            message,
        ))
        .await;

        let mut ctx = Context::new();
        ctx.insert("host_name", &ride.host_name);
        ctx.insert("passenger_name", &request.passenger_name);
        ctx.insert("passenger_email", &request.passenger_email);
        ctx.insert("origin", &ride.origin);
        ctx.insert("destination", &ride.destination);
        ctx.insert("date", &ride.date.to_string());
        ctx.insert("time", &ride.time.format("%H:%M").to_string());
        ctx.insert(
            "approve_link",
            &self.host_deep_link(&request.id, DecisionAction::Approve, token),
        );
        ctx.insert(
            "reject_link",
            &self.host_deep_link(&request.id, DecisionAction::Reject, token),
        );

        self.mail(&ride.host_email, &title, "request_alert.html", &ctx)
            .await;
    }

    /// Decision taken: notify the passenger (never the deciding host).
    pub async fn request_decided(&self, ride: &Ride, request: &RideRequest) {
        let approved = request.state == STATE_APPROVED;
        let (kind, title) = if approved {
            (
                KIND_REQUEST_APPROVED,
                format!("You're in: {} → {}", ride.origin, ride.destination),
            )
        } else {
            (
                KIND_REQUEST_REJECTED,
                format!("Request declined: {} → {}", ride.origin, ride.destination),
            )
        };
        let message = if approved {
            format!(
                "{} approved your request for the ride on {} at {}. Contact: {}.",
                ride.host_name, ride.date, ride.time, ride.contact_number
            )
        } else {
            format!(
                "{} declined your request for the ride on {} at {}.",
                ride.host_name, ride.date, ride.time
            )
        };
        self.store(Notification::new(
            request.passenger_email.clone(),
            kind,
            title.clone(),
            message.clone(),
        ))
        .await;

        let mut ctx = Context::new();
        ctx.insert("passenger_name", &request.passenger_name);
        ctx.insert("approved", &approved);
        ctx.insert("host_name", &ride.host_name);
        ctx.insert("origin", &ride.origin);
        ctx.insert("destination", &ride.destination);
        ctx.insert("date", &ride.date.to_string());
        ctx.insert("time", &ride.time.format("%H:%M").to_string());
        ctx.insert("contact_number", &ride.contact_number);
        ctx.insert(
            "whatsapp_link",
            &self.whatsapp_link(&ride.contact_number, ride),
        );

        self.mail(&request.passenger_email, &title, "request_decided.html", &ctx)
            .await;
    }

    /// Ride cancelled: one notification per affected passenger, none for
    /// the cancelling host.
    pub async fn ride_cancelled(&self, ride: &Ride, affected: &[RideRequest]) {
        let title = format!("Ride cancelled: {} → {}", ride.origin, ride.destination);
        let message = format!(
            "{} cancelled the ride on {} at {}. Your request was withdrawn.",
            ride.host_name, ride.date, ride.time
        );
        for request in affected {
            self.store(Notification::new(
                request.passenger_email.clone(),
                KIND_RIDE_CANCELLED,
                title.clone(),
                message.clone(),
            ))
            .await;
        }
    }

    async fn store(&self, notification: Notification) {
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(
                "Failed to store {} notification for {}: {}",
                notification.kind, notification.owner_email, e
            );
        }
    }

    async fn mail(&self, recipient: &str, subject: &str, template: &str, ctx: &Context) {
        let body = match self.templates.render(template, ctx) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to render {}: {}", template, e);
                return;
            }
        };
        if let Err(e) = self.email.send(recipient, subject, &body).await {
            warn!("Failed to hand off email to {}: {}", recipient, e);
        }
    }
}
