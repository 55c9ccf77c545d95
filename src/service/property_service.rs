use crate::dto::intake_dto::MessageResponse;
use crate::dto::property_dto::{AgentSummary, ImageUpload, NewProperty, PropertyPatch, PropertyResponse};
use crate::model::property::{Property, PropertyFilter, PropertyStatus};
use crate::model::user::Caller;
use crate::repository::property_repo::PropertyRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::minio::ImageStore;
use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_IMAGES: usize = 5;

#[async_trait]
pub trait PropertyService: Send + Sync {
    async fn create_property(&self, caller: Caller, fields: NewProperty, images: Vec<ImageUpload>) -> ServiceResult<PropertyResponse>;
    async fn list_properties(&self, filter: PropertyFilter) -> ServiceResult<Vec<PropertyResponse>>;
    async fn get_property(&self, caller: Option<Caller>, id: ObjectId) -> ServiceResult<PropertyResponse>;
    async fn my_properties(&self, caller: Caller) -> ServiceResult<Vec<PropertyResponse>>;
    async fn update_property(&self, caller: Caller, id: ObjectId, patch: PropertyPatch, images: Vec<ImageUpload>) -> ServiceResult<PropertyResponse>;
    /// Admin-only move to Approved or Rejected
    async fn set_status(&self, caller: Caller, id: ObjectId, status: PropertyStatus) -> ServiceResult<PropertyResponse>;
    async fn delete_property(&self, caller: Caller, id: ObjectId) -> ServiceResult<MessageResponse>;
}

pub struct PropertyServiceImpl {
    pub property_repo: Arc<dyn PropertyRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub image_store: Arc<dyn ImageStore>,
    pub max_images: usize,
}

impl PropertyServiceImpl {
    pub fn new(
        property_repo: Arc<dyn PropertyRepository>,
        user_repo: Arc<dyn UserRepository>,
        image_store: Arc<dyn ImageStore>,
        max_images: usize,
    ) -> Self {
        Self { property_repo, user_repo, image_store, max_images }
    }

    fn check_images(&self, images: &[ImageUpload]) -> ServiceResult<()> {
        if images.len() > self.max_images {
            return Err(ServiceError::InvalidInput(format!("At most {} images are allowed", self.max_images)));
        }
        if let Some(bad) = images.iter().find(|img| !img.content_type.starts_with("image/")) {
            return Err(ServiceError::InvalidInput(format!("Only image uploads are accepted, got {}", bad.content_type)));
        }
        Ok(())
    }

    /// Uploads in parallel and keeps the request order. Objects already stored when
    /// one upload fails are not removed.
    async fn upload_images(&self, property_id: ObjectId, images: Vec<ImageUpload>) -> ServiceResult<Vec<String>> {
        let uploads = images.into_iter().map(|image| {
            let object_name = format!("properties/{}/{}{}", property_id.to_hex(), Uuid::new_v4(), image.extension());
            let store = self.image_store.clone();
            async move { store.upload_image(&object_name, image.data, &image.content_type).await }
        });
        let urls = try_join_all(uploads).await.map_err(|e| {
            warn!(property = %property_id, "Image upload failed, earlier uploads may be orphaned");
            ServiceError::from(e)
        })?;
        Ok(urls)
    }

    async fn with_agents(&self, properties: Vec<Property>) -> ServiceResult<Vec<PropertyResponse>> {
        let mut agent_ids: Vec<ObjectId> = properties.iter().filter_map(|p| p.agent).collect();
        agent_ids.sort();
        agent_ids.dedup();

        let agents: HashMap<ObjectId, AgentSummary> = self.user_repo.find_by_ids(&agent_ids).await?
            .iter()
            .filter_map(|user| user.id.map(|id| (id, AgentSummary::from(user))))
            .collect();

        Ok(properties
            .into_iter()
            .map(|property| {
                let agent = property.agent.and_then(|id| agents.get(&id).cloned());
                PropertyResponse::new(property, agent)
            })
            .collect())
    }

    async fn with_agent(&self, property: Property) -> ServiceResult<PropertyResponse> {
        let mut populated = self.with_agents(vec![property]).await?;
        populated.pop().ok_or_else(|| ServiceError::InternalError("Lost property while populating agent".to_string()))
    }

    async fn find(&self, id: ObjectId) -> ServiceResult<Property> {
        self.property_repo.get_by_id(id).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::NotFound(_) => ServiceError::NotFound("Property not found".to_string()),
            other => other,
        })
    }
}

#[async_trait]
impl PropertyService for PropertyServiceImpl {
    #[instrument(skip(self, fields, images), fields(agent = %caller.id, images = images.len()))]
    async fn create_property(&self, caller: Caller, fields: NewProperty, images: Vec<ImageUpload>) -> ServiceResult<PropertyResponse> {
        self.check_images(&images)?;
        let id = ObjectId::new();
        let image_urls = self.upload_images(id, images).await?;

        let property = Property {
            id: Some(id),
            title: fields.title,
            description: fields.description,
            price: fields.price,
            location: fields.location,
            property_type: fields.property_type,
            status: PropertyStatus::Pending,
            beds: fields.beds,
            baths: fields.baths,
            sqft: fields.sqft,
            furnishing: fields.furnishing.unwrap_or_else(|| "Unfurnished".to_string()),
            images: image_urls,
            agent: Some(caller.id),
            created_at: None,
            updated_at: None,
        };
        let created = self.property_repo.create(property).await?;
        info!(property = %id, "Property listed, awaiting approval");
        self.with_agent(created).await
    }

    #[instrument(skip(self))]
    async fn list_properties(&self, filter: PropertyFilter) -> ServiceResult<Vec<PropertyResponse>> {
        let properties = self.property_repo.list(&filter).await?;
        self.with_agents(properties).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_property(&self, caller: Option<Caller>, id: ObjectId) -> ServiceResult<PropertyResponse> {
        let property = self.find(id).await?;
        let visible = property.is_public() || caller.is_some_and(|c| c.can_manage(property.agent.as_ref()));
        if !visible {
            return Err(ServiceError::NotFound("Property not found".to_string()));
        }
        self.with_agent(property).await
    }

    #[instrument(skip(self), fields(agent = %caller.id))]
    async fn my_properties(&self, caller: Caller) -> ServiceResult<Vec<PropertyResponse>> {
        let properties = self.property_repo.list(&PropertyFilter::by_agent(caller.id)).await?;
        self.with_agents(properties).await
    }

    #[instrument(skip(self, patch, images), fields(id = %id, caller = %caller.id, images = images.len()))]
    async fn update_property(&self, caller: Caller, id: ObjectId, patch: PropertyPatch, images: Vec<ImageUpload>) -> ServiceResult<PropertyResponse> {
        let mut property = self.find(id).await?;
        if !caller.can_manage(property.agent.as_ref()) {
            return Err(ServiceError::Forbidden("Not authorized to update this property".to_string()));
        }
        self.check_images(&images)?;

        patch.apply(&mut property);
        if !images.is_empty() {
            property.images = self.upload_images(id, images).await?;
        }
        property.status = property.status.after_edit(caller.is_admin());

        let updated = self.property_repo.update(id, property).await?;
        info!(status = updated.status.as_str(), "Property updated");
        self.with_agent(updated).await
    }

    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn set_status(&self, caller: Caller, id: ObjectId, status: PropertyStatus) -> ServiceResult<PropertyResponse> {
        if !caller.is_admin() {
            return Err(ServiceError::Forbidden("Admin access required".to_string()));
        }
        self.find(id).await?;
        let updated = self.property_repo.update_status(id, status).await?;
        info!("Property status changed");
        self.with_agent(updated).await
    }

    #[instrument(skip(self), fields(id = %id, caller = %caller.id))]
    async fn delete_property(&self, caller: Caller, id: ObjectId) -> ServiceResult<MessageResponse> {
        let property = self.find(id).await?;
        if !caller.can_manage(property.agent.as_ref()) {
            return Err(ServiceError::Forbidden("Not authorized to delete this property".to_string()));
        }
        self.property_repo.delete(id).await?;
        info!("Property deleted");
        Ok(MessageResponse::ok("Property deleted successfully"))
    }
}
