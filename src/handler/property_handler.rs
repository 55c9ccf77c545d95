use axum::{
    extract::{rejection::QueryRejection, Extension, FromRequest, Multipart, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use crate::dto::property_dto::{ImageUpload, PropertyForm, PropertyQuery};
use crate::handler::{parse_json, parse_object_id};
use crate::middlewares::auth_middleware::MaybeCaller;
use crate::model::property::PropertyStatus;
use crate::model::user::Caller;
use crate::service::property_service::PropertyService;
use crate::util::error::{HandlerError, HandlerErrorKind};

pub type PropertyServiceState = Arc<dyn PropertyService>;

/// Text parts fill the form; parts named `images` are collected as uploads
async fn read_property_form(mut multipart: Multipart) -> Result<(PropertyForm, Vec<ImageUpload>), HandlerError> {
    let mut form = PropertyForm::default();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await
        .map_err(|e| HandlerError::bad_request("Malformed multipart body").with_details(e.body_text()))?
    {
        let name = field.name().map(str::to_string).unwrap_or_default();
        if name == "images" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string).unwrap_or_default();
            let data = field.bytes().await
                .map_err(|e| HandlerError::bad_request("Failed to read image").with_details(e.body_text()))?;
            if data.is_empty() {
                continue;
            }
            debug!(?file_name, size = data.len(), "Received image part");
            images.push(ImageUpload { file_name, content_type, data: data.to_vec() });
        } else {
            let value = field.text().await
                .map_err(|e| HandlerError::bad_request(format!("Failed to read field {}", name)).with_details(e.body_text()))?;
            form.set(&name, value);
        }
    }
    Ok((form, images))
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("application/json"))
}

async fn read_multipart(request: Request) -> Result<(PropertyForm, Vec<ImageUpload>), HandlerError> {
    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| HandlerError::bad_request("Expected a multipart/form-data body").with_details(e.body_text()))?;
    read_property_form(multipart).await
}

/// Edits also arrive as plain JSON; those never carry new images
async fn read_edit_form(request: Request) -> Result<(PropertyForm, Vec<ImageUpload>), HandlerError> {
    if !is_json(&request) {
        return read_multipart(request).await;
    }
    let body = parse_json(Json::<Map<String, Value>>::from_request(request, &()).await)?;
    Ok((PropertyForm::from_json(body), Vec::new()))
}

pub async fn list_properties_handler(
    State(service): State<PropertyServiceState>,
    Extension(MaybeCaller(caller)): Extension<MaybeCaller>,
    query: Result<Query<PropertyQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Query(query) = query.map_err(|e| HandlerError::bad_request("Invalid query string").with_details(e.body_text()))?;
    let filter = query
        .into_filter(caller.is_some_and(|c| c.is_admin()))
        .map_err(|msg| HandlerError::new(HandlerErrorKind::Validation, msg))?;
    let properties = service.list_properties(filter).await?;
    Ok(Json(properties))
}

pub async fn get_property_handler(
    State(service): State<PropertyServiceState>,
    Extension(MaybeCaller(caller)): Extension<MaybeCaller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "property")?;
    let property = service.get_property(caller, id).await?;
    Ok(Json(property))
}

pub async fn my_properties_handler(
    State(service): State<PropertyServiceState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, HandlerError> {
    let properties = service.my_properties(caller).await?;
    Ok(Json(properties))
}

pub async fn create_property_handler(
    State(service): State<PropertyServiceState>,
    Extension(caller): Extension<Caller>,
    request: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let (form, images) = read_multipart(request).await?;
    let fields = form
        .into_new_property()
        .map_err(|msg| HandlerError::new(HandlerErrorKind::Validation, msg))?;
    let created = service.create_property(caller, fields, images).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_property_handler(
    State(service): State<PropertyServiceState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    request: Request,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "property")?;
    let (form, images) = read_edit_form(request).await?;
    let patch = form
        .into_patch()
        .map_err(|msg| HandlerError::new(HandlerErrorKind::Validation, msg))?;
    let updated = service.update_property(caller, id, patch, images).await?;
    Ok(Json(updated))
}

pub async fn approve_property_handler(
    State(service): State<PropertyServiceState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "property")?;
    let property = service.set_status(caller, id, PropertyStatus::Approved).await?;
    Ok(Json(property))
}

pub async fn reject_property_handler(
    State(service): State<PropertyServiceState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "property")?;
    let property = service.set_status(caller, id, PropertyStatus::Rejected).await?;
    Ok(Json(property))
}

pub async fn delete_property_handler(
    State(service): State<PropertyServiceState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "property")?;
    let res = service.delete_property(caller, id).await?;
    Ok(Json(res))
}
