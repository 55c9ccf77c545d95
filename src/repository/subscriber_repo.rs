use crate::model::subscriber::Subscriber;
use crate::model::timestamp_now;
use crate::repository::mongo::SUBSCRIBERS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, Database};
use tracing::{error, instrument};

#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the email is already subscribed
    async fn create(&self, subscriber: Subscriber) -> RepositoryResult<Subscriber>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Subscriber>>;
    async fn list(&self) -> RepositoryResult<Vec<Subscriber>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoSubscriberRepository {
    collection: mongodb::Collection<Subscriber>,
}

impl MongoSubscriberRepository {
    pub fn new(db: &Database) -> Self {
        MongoSubscriberRepository { collection: db.collection::<Subscriber>(SUBSCRIBERS) }
    }
}

#[async_trait]
impl SubscriberRepository for MongoSubscriberRepository {
    #[instrument(skip(self, subscriber), fields(email = %subscriber.email))]
    async fn create(&self, mut subscriber: Subscriber) -> RepositoryResult<Subscriber> {
        subscriber.id = Some(ObjectId::new());
        subscriber.created_at = Some(timestamp_now());
        match self.collection.insert_one(&subscriber, None).await {
            Ok(_) => Ok(subscriber),
            Err(e) => match RepositoryError::from(e) {
                err @ RepositoryError::AlreadyExists(_) => Err(err),
                err => {
                    error!("Failed to store subscriber: {}", err);
                    Err(err)
                }
            },
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Subscriber>> {
        Ok(self.collection.find_one(doc! { "email": email }, None).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Subscriber>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(None, None).await?)
    }
}
