use crate::dto::intake_dto::{ContactRequest, InquiryRequest, InquiryResponse, MessageResponse, SubscriberResponse};
use crate::model::contact::ContactMessage;
use crate::model::inquiry::{Inquiry, InquiryStatus};
use crate::model::subscriber::Subscriber;
use crate::repository::contact_repo::ContactRepository;
use crate::repository::inquiry_repo::InquiryRepository;
use crate::repository::property_repo::PropertyRepository;
use crate::repository::repository_error::RepositoryError;
use crate::repository::subscriber_repo::SubscriberRepository;
use crate::service::user_service::normalize_email;
use crate::util::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const ALREADY_SUBSCRIBED: &str = "Email is already subscribed";

/// Unauthenticated inquiries, contact messages and newsletter sign-ups
#[async_trait]
pub trait IntakeService: Send + Sync {
    async fn create_inquiry(&self, request: InquiryRequest) -> ServiceResult<MessageResponse>;
    async fn list_inquiries(&self) -> ServiceResult<Vec<InquiryResponse>>;
    async fn update_inquiry_status(&self, id: ObjectId, status: InquiryStatus) -> ServiceResult<InquiryResponse>;
    async fn create_contact(&self, request: ContactRequest) -> ServiceResult<MessageResponse>;
    async fn subscribe(&self, email: String) -> ServiceResult<MessageResponse>;
    async fn list_subscribers(&self) -> ServiceResult<Vec<SubscriberResponse>>;
}

pub struct IntakeServiceImpl {
    pub inquiry_repo: Arc<dyn InquiryRepository>,
    pub contact_repo: Arc<dyn ContactRepository>,
    pub subscriber_repo: Arc<dyn SubscriberRepository>,
    pub property_repo: Arc<dyn PropertyRepository>,
}

impl IntakeServiceImpl {
    pub fn new(
        inquiry_repo: Arc<dyn InquiryRepository>,
        contact_repo: Arc<dyn ContactRepository>,
        subscriber_repo: Arc<dyn SubscriberRepository>,
        property_repo: Arc<dyn PropertyRepository>,
    ) -> Self {
        Self { inquiry_repo, contact_repo, subscriber_repo, property_repo }
    }

    /// Title of the referenced property, when the id names one
    async fn property_title(&self, property_id: &str) -> ServiceResult<Option<String>> {
        let Ok(id) = ObjectId::parse_str(property_id) else {
            debug!("Inquiry references a non-ObjectId property id");
            return Ok(None);
        };
        match self.property_repo.get_by_id(id).await {
            Ok(property) => Ok(Some(property.title)),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[async_trait]
impl IntakeService for IntakeServiceImpl {
    #[instrument(skip(self, request), fields(property = ?request.property_id))]
    async fn create_inquiry(&self, request: InquiryRequest) -> ServiceResult<MessageResponse> {
        let property_id = non_blank(request.property_id);
        let mut property_title = non_blank(request.property_title);
        if property_title.is_none() {
            if let Some(id) = &property_id {
                property_title = self.property_title(id).await?;
            }
        }

        let inquiry = Inquiry {
            id: None,
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            message: request.message.trim().to_string(),
            property_id,
            property_title,
            agent_name: non_blank(request.agent_name),
            status: InquiryStatus::Pending,
            created_at: None,
            updated_at: None,
        };
        self.inquiry_repo.create(inquiry).await?;
        info!("Inquiry received");
        Ok(MessageResponse::ok("Inquiry sent successfully!"))
    }

    #[instrument(skip(self))]
    async fn list_inquiries(&self) -> ServiceResult<Vec<InquiryResponse>> {
        let inquiries = self.inquiry_repo.list().await?;
        Ok(inquiries.into_iter().map(InquiryResponse::from).collect())
    }

    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn update_inquiry_status(&self, id: ObjectId, status: InquiryStatus) -> ServiceResult<InquiryResponse> {
        let updated = self.inquiry_repo.update_status(id, status).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::NotFound(_) => ServiceError::NotFound("Inquiry not found".to_string()),
            other => other,
        })?;
        Ok(InquiryResponse::from(updated))
    }

    #[instrument(skip(self, request))]
    async fn create_contact(&self, request: ContactRequest) -> ServiceResult<MessageResponse> {
        let message = ContactMessage {
            id: None,
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            phone: non_blank(request.phone),
            message: request.message.trim().to_string(),
            created_at: None,
        };
        self.contact_repo.create(message).await?;
        info!("Contact message received");
        Ok(MessageResponse::ok("Message sent successfully!"))
    }

    #[instrument(skip(self, email))]
    async fn subscribe(&self, email: String) -> ServiceResult<MessageResponse> {
        let email = normalize_email(&email);
        if self.subscriber_repo.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(ALREADY_SUBSCRIBED.to_string()));
        }

        let subscriber = Subscriber { id: None, email, created_at: None };
        match self.subscriber_repo.create(subscriber).await {
            Ok(_) => {
                info!("New newsletter subscriber");
                Ok(MessageResponse::ok("Subscribed successfully!"))
            }
            // lost a race with a concurrent sign-up; the unique index caught it
            Err(RepositoryError::AlreadyExists(_)) => Err(ServiceError::Conflict(ALREADY_SUBSCRIBED.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_subscribers(&self) -> ServiceResult<Vec<SubscriberResponse>> {
        let subscribers = self.subscriber_repo.list().await?;
        Ok(subscribers.into_iter().map(SubscriberResponse::from).collect())
    }
}
