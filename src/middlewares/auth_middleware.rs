use axum::{body::Body, extract::State, http::{header::AUTHORIZATION, Request}, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::warn;
use crate::model::user::Caller;
use crate::util::error::HandlerError;
use crate::util::jwt::{JwtError, JwtTokenUtils};

pub struct AuthState {
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
}

/// Caller identity on routes where the token is optional
#[derive(Debug, Clone, Copy)]
pub struct MaybeCaller(pub Option<Caller>);

impl AuthState {
    fn caller_from_header(&self, auth_header: &str) -> Result<Caller, HandlerError> {
        let token = self.jwt_utils.extract_token_from_header(auth_header)
            .map_err(|_| HandlerError::unauthorized("Malformed authorization header"))?;
        let claims = self.jwt_utils.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => HandlerError::unauthorized("Token expired"),
            _ => HandlerError::unauthorized("Invalid token"),
        })?;
        claims.caller().map_err(|_| HandlerError::unauthorized("Invalid token"))
    }
}

fn authorization(req: &Request<Body>) -> Result<Option<&str>, HandlerError> {
    match req.headers().get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| HandlerError::unauthorized("Malformed authorization header")),
    }
}

pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let header = authorization(&req)?.ok_or_else(|| HandlerError::unauthorized("No token, authorization denied"))?;
    let caller = state.caller_from_header(header)?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let header = authorization(&req)?.ok_or_else(|| HandlerError::unauthorized("No token, authorization denied"))?;
    let caller = state.caller_from_header(header)?;
    if !caller.is_admin() {
        warn!(caller = %caller.id, "Non-admin caller on admin route");
        return Err(HandlerError::forbidden("Admin access required"));
    }
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Anonymous when no header is sent; a header that fails validation is still a 401
pub async fn optional_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let caller = match authorization(&req)? {
        Some(header) => Some(state.caller_from_header(header)?),
        None => None,
    };
    req.extensions_mut().insert(MaybeCaller(caller));
    Ok(next.run(req).await)
}
