use axum::{Router, routing::{get, post}, middleware};
use crate::handler::auth_handler::{
    forgot_password_handler,
    get_profile_handler,
    list_users_handler,
    login_handler,
    signup_handler,
    update_profile_handler,
    UserServiceState,
};
use std::sync::Arc;
use crate::middlewares::auth_middleware::{require_admin, require_auth, AuthState};

pub fn auth_router(service: UserServiceState, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/forgot-password", post(forgot_password_handler));

    let authenticated = Router::new()
        .route("/api/auth/profile", get(get_profile_handler).put(update_profile_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/auth/users", get(list_users_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(service)
}
