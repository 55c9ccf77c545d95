use crate::model::property::{Property, PropertyFilter, PropertyStatus};
use crate::model::timestamp_now;
use crate::repository::mongo::PROPERTIES;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::{options::FindOptions, Database};
use tracing::{error, info, instrument};

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Inserts the property, keeping a pre-assigned id if present
    async fn create(&self, property: Property) -> RepositoryResult<Property>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Property>;
    /// Matching properties, newest first
    async fn list(&self, filter: &PropertyFilter) -> RepositoryResult<Vec<Property>>;
    async fn update(&self, id: ObjectId, property: Property) -> RepositoryResult<Property>;
    async fn update_status(&self, id: ObjectId, status: PropertyStatus) -> RepositoryResult<Property>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoPropertyRepository {
    collection: mongodb::Collection<Property>,
}

impl MongoPropertyRepository {
    pub fn new(db: &Database) -> Self {
        MongoPropertyRepository { collection: db.collection::<Property>(PROPERTIES) }
    }
}

#[async_trait]
impl PropertyRepository for MongoPropertyRepository {
    #[instrument(skip(self, property), fields(title = %property.title))]
    async fn create(&self, mut property: Property) -> RepositoryResult<Property> {
        if property.id.is_none() {
            property.id = Some(ObjectId::new());
        }
        let now = timestamp_now();
        property.created_at = Some(now.clone());
        property.updated_at = Some(now);

        match self.collection.insert_one(&property, None).await {
            Ok(_) => {
                info!("Property created successfully");
                Ok(property)
            }
            Err(e) => {
                error!("Failed to create property: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Property> {
        let result = self.collection.find_one(doc! { "_id": id }, None).await;
        match result {
            Ok(Some(property)) => Ok(property),
            Ok(None) => Err(RepositoryError::not_found(format!("Property not found for ID: {}", id))),
            Err(e) => {
                error!("Failed to fetch property by ID: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch property by ID: {}", e)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &PropertyFilter) -> RepositoryResult<Vec<Property>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let mut cursor = self.collection.find(filter.to_document(), options).await
            .map_err(|e| RepositoryError::database(format!("Failed to list properties: {}", e)))?;

        let mut properties = Vec::new();
        while let Some(property) = cursor.next().await {
            match property {
                Ok(p) => properties.push(p),
                Err(e) => {
                    error!("Failed to deserialize property: {}", e);
                    return Err(RepositoryError::serialization(format!("Failed to deserialize property: {}", e)));
                }
            }
        }
        info!("Fetched {} properties", properties.len());
        Ok(properties)
    }

    #[instrument(skip(self, property), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut property: Property) -> RepositoryResult<Property> {
        property.id = Some(id);
        property.updated_at = Some(timestamp_now());
        let mut doc = bson::to_document(&property)?;
        doc.remove("_id");
        let result = self.collection.update_one(doc! { "_id": id }, doc! { "$set": doc }, None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => {
                info!("Property updated successfully");
                Ok(property)
            }
            Ok(_) => Err(RepositoryError::not_found(format!("No property found to update for ID: {}", id))),
            Err(e) => {
                error!("Failed to update property: {}", e);
                Err(RepositoryError::database(format!("Failed to update property: {}", e)))
            }
        }
    }

    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn update_status(&self, id: ObjectId, status: PropertyStatus) -> RepositoryResult<Property> {
        let update = doc! { "$set": { "status": status.as_str(), "updatedAt": timestamp_now() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => {
                info!("Property status updated");
                self.get_by_id(id).await
            }
            Ok(_) => Err(RepositoryError::not_found(format!("No property found to update status for ID: {}", id))),
            Err(e) => {
                error!("Failed to update property status: {}", e);
                Err(RepositoryError::database(format!("Failed to update property status: {}", e)))
            }
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await;
        match result {
            Ok(delete_result) if delete_result.deleted_count > 0 => {
                info!("Property deleted successfully");
                Ok(())
            }
            Ok(_) => Err(RepositoryError::not_found(format!("No property found to delete for ID: {}", id))),
            Err(e) => {
                error!("Failed to delete property: {}", e);
                Err(RepositoryError::database(format!("Failed to delete property: {}", e)))
            }
        }
    }
}
