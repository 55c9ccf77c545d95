use crate::dto::trimmed;
use crate::model::inquiry::{Inquiry, InquiryStatus};
use crate::model::subscriber::Subscriber;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
    pub property_id: Option<String>,
    pub property_title: Option<String>,
    pub agent_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryStatusRequest {
    pub status: String,
}

/// `{success, message}` body used by the intake and reset endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        MessageResponse { success: true, message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub property_id: Option<String>,
    pub property_title: Option<String>,
    pub agent_name: Option<String>,
    pub status: InquiryStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Inquiry> for InquiryResponse {
    fn from(inquiry: Inquiry) -> Self {
        InquiryResponse {
            id: inquiry.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: inquiry.name,
            email: inquiry.email,
            message: inquiry.message,
            property_id: inquiry.property_id,
            property_title: inquiry.property_title,
            agent_name: inquiry.agent_name,
            status: inquiry.status,
            created_at: inquiry.created_at,
            updated_at: inquiry.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub created_at: Option<String>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        SubscriberResponse {
            id: subscriber.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: subscriber.email,
            created_at: subscriber.created_at,
        }
    }
}
