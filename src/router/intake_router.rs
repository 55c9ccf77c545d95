use axum::{Router, routing::{get, post, put}, middleware};
use crate::handler::intake_handler::{
    create_contact_handler,
    create_inquiry_handler,
    list_inquiries_handler,
    list_subscribers_handler,
    subscribe_handler,
    update_inquiry_status_handler,
    IntakeServiceState,
};
use std::sync::Arc;
use crate::middlewares::auth_middleware::{require_admin, AuthState};

pub fn intake_router(service: IntakeServiceState, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/api/inquiries", post(create_inquiry_handler))
        .route("/api/contact", post(create_contact_handler))
        .route("/api/subscribe", post(subscribe_handler));

    let admin = Router::new()
        .route("/api/inquiries", get(list_inquiries_handler))
        .route("/api/inquiries/{id}/status", put(update_inquiry_status_handler))
        .route("/api/subscribe", get(list_subscribers_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public
        .merge(admin)
        .with_state(service)
}
