pub mod auth_handler;
pub mod property_handler;
pub mod intake_handler;

use crate::util::error::{HandlerError, HandlerErrorKind};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use bson::oid::ObjectId;
use validator::Validate;

/// Turns axum's plain-text JSON rejections into the API error body
pub fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| HandlerError::bad_request("Invalid JSON body").with_details(rejection.body_text()))
}

pub fn validate<T: Validate>(payload: &T) -> Result<(), HandlerError> {
    payload.validate().map_err(|errors| {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());
        HandlerError::new(HandlerErrorKind::Validation, message).with_details(errors.to_string())
    })
}

pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request(format!("Invalid {} id", what)))
}
