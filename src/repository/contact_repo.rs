use crate::model::contact::ContactMessage;
use crate::model::timestamp_now;
use crate::repository::mongo::CONTACTS;
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use bson::oid::ObjectId;
use mongodb::Database;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, message: ContactMessage) -> RepositoryResult<ContactMessage>;
}

pub struct MongoContactRepository {
    collection: mongodb::Collection<ContactMessage>,
}

impl MongoContactRepository {
    pub fn new(db: &Database) -> Self {
        MongoContactRepository { collection: db.collection::<ContactMessage>(CONTACTS) }
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    async fn create(&self, mut message: ContactMessage) -> RepositoryResult<ContactMessage> {
        message.id = Some(ObjectId::new());
        message.created_at = Some(timestamp_now());
        self.collection.insert_one(&message, None).await?;
        Ok(message)
    }
}
