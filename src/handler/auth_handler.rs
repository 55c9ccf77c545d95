use axum::{extract::{rejection::JsonRejection, Extension, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use crate::dto::auth_dto::{ForgotPasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::handler::{parse_json, validate};
use crate::model::user::Caller;
use crate::service::user_service::UserService;
use crate::util::error::HandlerError;

pub type UserServiceState = Arc<dyn UserService>;

pub async fn signup_handler(
    State(service): State<UserServiceState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    validate(&payload)?;
    let res = service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn login_handler(
    State(service): State<UserServiceState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    validate(&payload)?;
    let res = service.login(payload.email, payload.password).await?;
    Ok(Json(res))
}

pub async fn forgot_password_handler(
    State(service): State<UserServiceState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    if blank(&payload.email) || blank(&payload.new_password) {
        return Err(HandlerError::bad_request("Email and new password are required"));
    }
    let (email, new_password) = (payload.email.unwrap_or_default(), payload.new_password.unwrap_or_default());
    if new_password.len() < 6 {
        return Err(HandlerError::bad_request("Password must be at least 6 characters"));
    }
    let res = service.reset_password(email, new_password).await?;
    Ok(Json(res))
}

pub async fn get_profile_handler(
    State(service): State<UserServiceState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_profile(caller).await?;
    Ok(Json(res))
}

pub async fn update_profile_handler(
    State(service): State<UserServiceState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    validate(&payload)?;
    let res = service.update_profile(caller, payload).await?;
    Ok(Json(res))
}

pub async fn list_users_handler(
    State(service): State<UserServiceState>,
) -> Result<impl IntoResponse, HandlerError> {
    let users = service.list_users().await?;
    Ok(Json(users))
}
