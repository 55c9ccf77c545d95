#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::{Request, StatusCode}, Router};
use bson::oid::ObjectId;
use dreamnest_backend::app::{create_router, AppServices};
use dreamnest_backend::config::{AppConfig, JwtConfig};
use dreamnest_backend::model::contact::ContactMessage;
use dreamnest_backend::model::inquiry::{Inquiry, InquiryStatus};
use dreamnest_backend::model::property::{Property, PropertyFilter, PropertyStatus};
use dreamnest_backend::model::subscriber::Subscriber;
use dreamnest_backend::model::timestamp_now;
use dreamnest_backend::model::user::{User, UserRole};
use dreamnest_backend::repository::contact_repo::ContactRepository;
use dreamnest_backend::repository::inquiry_repo::InquiryRepository;
use dreamnest_backend::repository::property_repo::PropertyRepository;
use dreamnest_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use dreamnest_backend::repository::subscriber_repo::SubscriberRepository;
use dreamnest_backend::repository::user_repo::UserRepository;
use dreamnest_backend::service::intake_service::IntakeServiceImpl;
use dreamnest_backend::service::property_service::PropertyServiceImpl;
use dreamnest_backend::service::user_service::UserServiceImpl;
use dreamnest_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use dreamnest_backend::util::minio::{download_link, ImageStore, MinioError};
use dreamnest_backend::util::password::{PasswordUtils, PasswordUtilsImpl};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Newest first, the way the Mongo repositories sort on createdAt
fn newest_first<T: Clone>(items: &[T]) -> Vec<T> {
    items.iter().rev().cloned().collect()
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    pub users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("Duplicate key: email"));
        }
        user.id = Some(ObjectId::new());
        let now = timestamp_now();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email && u.id != Some(id)) {
            return Err(RepositoryError::already_exists("Duplicate key: email"));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No user found to update"))?;
        user.id = Some(id);
        user.updated_at = Some(timestamp_now());
        *slot = user.clone();
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(newest_first(self.users.lock().unwrap().as_slice()))
    }
}

#[derive(Default)]
pub struct InMemoryPropertyRepository {
    pub properties: Mutex<Vec<Property>>,
}

impl InMemoryPropertyRepository {
    pub fn status_of(&self, id: &str) -> Option<PropertyStatus> {
        let id = ObjectId::parse_str(id).ok()?;
        self.properties.lock().unwrap().iter().find(|p| p.id == Some(id)).map(|p| p.status)
    }

    pub fn len(&self) -> usize {
        self.properties.lock().unwrap().len()
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn create(&self, mut property: Property) -> RepositoryResult<Property> {
        if property.id.is_none() {
            property.id = Some(ObjectId::new());
        }
        let now = timestamp_now();
        property.created_at = Some(now.clone());
        property.updated_at = Some(now);
        self.properties.lock().unwrap().push(property.clone());
        Ok(property)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Property> {
        self.properties
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Property not found for ID: {}", id)))
    }

    async fn list(&self, filter: &PropertyFilter) -> RepositoryResult<Vec<Property>> {
        let found: Vec<Property> = self
            .properties
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(newest_first(&found))
    }

    async fn update(&self, id: ObjectId, mut property: Property) -> RepositoryResult<Property> {
        let mut properties = self.properties.lock().unwrap();
        let slot = properties
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No property found to update"))?;
        property.id = Some(id);
        property.updated_at = Some(timestamp_now());
        *slot = property.clone();
        Ok(property)
    }

    async fn update_status(&self, id: ObjectId, status: PropertyStatus) -> RepositoryResult<Property> {
        let mut properties = self.properties.lock().unwrap();
        let slot = properties
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No property found to update status"))?;
        slot.status = status;
        slot.updated_at = Some(timestamp_now());
        Ok(slot.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut properties = self.properties.lock().unwrap();
        let before = properties.len();
        properties.retain(|p| p.id != Some(id));
        if properties.len() == before {
            return Err(RepositoryError::not_found("No property found to delete"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryInquiryRepository {
    pub inquiries: Mutex<Vec<Inquiry>>,
}

#[async_trait]
impl InquiryRepository for InMemoryInquiryRepository {
    async fn create(&self, mut inquiry: Inquiry) -> RepositoryResult<Inquiry> {
        inquiry.id = Some(ObjectId::new());
        let now = timestamp_now();
        inquiry.created_at = Some(now.clone());
        inquiry.updated_at = Some(now);
        self.inquiries.lock().unwrap().push(inquiry.clone());
        Ok(inquiry)
    }

    async fn list(&self) -> RepositoryResult<Vec<Inquiry>> {
        Ok(newest_first(self.inquiries.lock().unwrap().as_slice()))
    }

    async fn update_status(&self, id: ObjectId, status: InquiryStatus) -> RepositoryResult<Inquiry> {
        let mut inquiries = self.inquiries.lock().unwrap();
        let slot = inquiries
            .iter_mut()
            .find(|i| i.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("Inquiry not found"))?;
        slot.status = status;
        slot.updated_at = Some(timestamp_now());
        Ok(slot.clone())
    }
}

#[derive(Default)]
pub struct InMemoryContactRepository {
    pub messages: Mutex<Vec<ContactMessage>>,
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, mut message: ContactMessage) -> RepositoryResult<ContactMessage> {
        message.id = Some(ObjectId::new());
        message.created_at = Some(timestamp_now());
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }
}

/// Mimics the unique email index, including when the service's pre-check is skipped
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    pub subscribers: Mutex<Vec<Subscriber>>,
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn create(&self, mut subscriber: Subscriber) -> RepositoryResult<Subscriber> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.iter().any(|s| s.email == subscriber.email) {
            return Err(RepositoryError::already_exists("Duplicate key: email"));
        }
        subscriber.id = Some(ObjectId::new());
        subscriber.created_at = Some(timestamp_now());
        subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Subscriber>> {
        Ok(self.subscribers.lock().unwrap().iter().find(|s| s.email == email).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Subscriber>> {
        Ok(newest_first(self.subscribers.lock().unwrap().as_slice()))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.subscribers.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryImageStore {
    pub objects: Mutex<Vec<(String, String, usize)>>,
    pub fail: AtomicBool,
}

impl InMemoryImageStore {
    pub fn object_names(&self) -> Vec<String> {
        self.objects.lock().unwrap().iter().map(|(name, _, _)| name.clone()).collect()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload_image(&self, object_name: &str, data: Vec<u8>, content_type: &str) -> Result<String, MinioError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MinioError::OperationError("Upload failed: connection reset".to_string()));
        }
        self.objects.lock().unwrap().push((object_name.to_string(), content_type.to_string(), data.len()));
        Ok(download_link("http://images.test", "property-images", object_name))
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub properties: Arc<InMemoryPropertyRepository>,
    pub inquiries: Arc<InMemoryInquiryRepository>,
    pub contacts: Arc<InMemoryContactRepository>,
    pub subscribers: Arc<InMemorySubscriberRepository>,
    pub images: Arc<InMemoryImageStore>,
    pub jwt: Arc<JwtTokenUtilsImpl>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let properties = Arc::new(InMemoryPropertyRepository::default());
        let inquiries = Arc::new(InMemoryInquiryRepository::default());
        let contacts = Arc::new(InMemoryContactRepository::default());
        let subscribers = Arc::new(InMemorySubscriberRepository::default());
        let images = Arc::new(InMemoryImageStore::default());
        let jwt = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));

        let services = AppServices {
            user_service: Arc::new(UserServiceImpl::new(users.clone(), jwt.clone())),
            property_service: Arc::new(PropertyServiceImpl::new(
                properties.clone(),
                users.clone(),
                images.clone(),
                config.max_property_images,
            )),
            intake_service: Arc::new(IntakeServiceImpl::new(
                inquiries.clone(),
                contacts.clone(),
                subscribers.clone(),
                properties.clone(),
            )),
            jwt_utils: jwt.clone(),
        };
        let router = create_router(services, &config);

        TestApp { router, users, properties, inquiries, contacts, subscribers, images, jwt }
    }

    /// Inserts a user directly and returns (id, token)
    pub async fn seed_user(&self, name: &str, email: &str, password: &str, role: UserRole) -> (ObjectId, String) {
        let user = User {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: PasswordUtilsImpl::hash_password(password).unwrap(),
            role,
            phone: None,
            dob: None,
            created_at: None,
            updated_at: None,
        };
        let user = self.users.insert(user).await.unwrap();
        let id = user.id.unwrap();
        (id, self.jwt.generate_token(&id, role).unwrap())
    }

    pub async fn seed_property(&self, title: &str, agent: Option<ObjectId>, status: PropertyStatus) -> String {
        let property = Property {
            id: None,
            title: title.to_string(),
            description: format!("{} description", title),
            price: 4_500_000.0,
            location: "Hinjewadi, Pune".to_string(),
            property_type: "For Rent".to_string(),
            status,
            beds: 2,
            baths: 2,
            sqft: 900.0,
            furnishing: "Semi-Furnished".to_string(),
            images: vec![],
            agent,
            created_at: None,
            updated_at: None,
        };
        self.properties.create(property).await.unwrap().id.unwrap().to_hex()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub const BOUNDARY: &str = "dreamnest-test-boundary";

/// (file name, content type, bytes)
pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

pub fn multipart_body(fields: &[(&str, &str)], images: &[FilePart]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (file_name, content_type, data) in images {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub const PROPERTY_FIELDS: &[(&str, &str)] = &[
    ("title", "Luxury 3BHK Apartment"),
    ("description", "Corner unit facing the park"),
    ("price", "8500000"),
    ("location", "Noida, Sector 75"),
    ("type", "For Sale"),
    ("beds", "3"),
    ("baths", "2"),
    ("sqft", "1650"),
];
