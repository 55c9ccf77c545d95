use crate::model::inquiry::{Inquiry, InquiryStatus};
use crate::model::timestamp_now;
use crate::repository::mongo::INQUIRIES;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use tracing::{info, instrument};

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn create(&self, inquiry: Inquiry) -> RepositoryResult<Inquiry>;
    /// All inquiries, newest first
    async fn list(&self) -> RepositoryResult<Vec<Inquiry>>;
    async fn update_status(&self, id: ObjectId, status: InquiryStatus) -> RepositoryResult<Inquiry>;
}

pub struct MongoInquiryRepository {
    collection: mongodb::Collection<Inquiry>,
}

impl MongoInquiryRepository {
    pub fn new(db: &Database) -> Self {
        MongoInquiryRepository { collection: db.collection::<Inquiry>(INQUIRIES) }
    }
}

#[async_trait]
impl InquiryRepository for MongoInquiryRepository {
    #[instrument(skip(self, inquiry), fields(email = %inquiry.email))]
    async fn create(&self, mut inquiry: Inquiry) -> RepositoryResult<Inquiry> {
        inquiry.id = Some(ObjectId::new());
        let now = timestamp_now();
        inquiry.created_at = Some(now.clone());
        inquiry.updated_at = Some(now);
        self.collection.insert_one(&inquiry, None).await?;
        info!("Inquiry stored");
        Ok(inquiry)
    }

    async fn list(&self) -> RepositoryResult<Vec<Inquiry>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn update_status(&self, id: ObjectId, status: InquiryStatus) -> RepositoryResult<Inquiry> {
        let update = doc! { "$set": { "status": status.as_str(), "updatedAt": timestamp_now() } };
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        self.collection
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Inquiry not found for ID: {}", id)))
    }
}
