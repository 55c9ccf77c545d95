use axum::{Router, routing::{get, post, put}, middleware};
use crate::handler::property_handler::{
    approve_property_handler,
    create_property_handler,
    delete_property_handler,
    get_property_handler,
    list_properties_handler,
    my_properties_handler,
    reject_property_handler,
    update_property_handler,
    PropertyServiceState,
};
use std::sync::Arc;
use crate::middlewares::auth_middleware::{optional_auth, require_admin, require_auth, AuthState};

pub fn property_router(service: PropertyServiceState, auth_state: Arc<AuthState>) -> Router {
    // Browsing is public; a valid token widens what an admin or owner sees
    let browse = Router::new()
        .route("/api/properties", get(list_properties_handler))
        .route("/api/properties/{id}", get(get_property_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), optional_auth));

    let owner = Router::new()
        .route("/api/properties", post(create_property_handler))
        .route("/api/properties/{id}", put(update_property_handler).delete(delete_property_handler))
        .route("/api/properties/user/my-properties", get(my_properties_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/properties/{id}/approve", put(approve_property_handler))
        .route("/api/properties/{id}/reject", put(reject_property_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    browse
        .merge(owner)
        .merge(admin)
        .with_state(service)
}
