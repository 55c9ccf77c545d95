use axum::{extract::{rejection::JsonRejection, Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use crate::dto::intake_dto::{ContactRequest, InquiryRequest, InquiryStatusRequest, SubscribeRequest};
use crate::handler::{parse_json, parse_object_id, validate};
use crate::model::inquiry::InquiryStatus;
use crate::service::intake_service::IntakeService;
use crate::util::error::{HandlerError, HandlerErrorKind};

pub type IntakeServiceState = Arc<dyn IntakeService>;

pub async fn create_inquiry_handler(
    State(service): State<IntakeServiceState>,
    payload: Result<Json<InquiryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    validate(&payload)?;
    let res = service.create_inquiry(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn list_inquiries_handler(
    State(service): State<IntakeServiceState>,
) -> Result<impl IntoResponse, HandlerError> {
    let inquiries = service.list_inquiries().await?;
    Ok(Json(inquiries))
}

pub async fn update_inquiry_status_handler(
    State(service): State<IntakeServiceState>,
    Path(id): Path<String>,
    payload: Result<Json<InquiryStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "inquiry")?;
    let payload = parse_json(payload)?;
    let status = InquiryStatus::parse(&payload.status).ok_or_else(|| {
        HandlerError::new(HandlerErrorKind::Validation, "Status must be one of pending, contacted, closed")
    })?;
    let inquiry = service.update_inquiry_status(id, status).await?;
    Ok(Json(inquiry))
}

pub async fn create_contact_handler(
    State(service): State<IntakeServiceState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    validate(&payload)?;
    let res = service.create_contact(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn subscribe_handler(
    State(service): State<IntakeServiceState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = parse_json(payload)?;
    validate(&payload)?;
    let res = service.subscribe(payload.email).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn list_subscribers_handler(
    State(service): State<IntakeServiceState>,
) -> Result<impl IntoResponse, HandlerError> {
    let subscribers = service.list_subscribers().await?;
    Ok(Json(subscribers))
}
