use crate::client::{ClientError, SessionStore};
use crate::dto::auth_dto::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UpdateProfileRequest, UserResponse};
use crate::dto::intake_dto::{MessageResponse, SubscribeRequest};
use crate::dto::property_dto::{ImageUpload, PropertyResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    message: String,
}

/// Typed client for the HTTP API; reads and writes credentials only through its `SessionStore`
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Sends the token when there is one; used for routes where auth is optional
    fn maybe_authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(%status, "API request failed");
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => Err(ClientError::Api { status: status.as_u16(), error: err.error, message: err.message }),
            Err(_) => Err(ClientError::Api { status: status.as_u16(), error: "Unknown".to_string(), message: body }),
        }
    }

    pub async fn signup(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let response = self.http.post(self.url("/api/auth/signup")).json(request).send().await?;
        let auth: AuthResponse = Self::parse(response).await?;
        self.session.set(auth.token.clone(), auth.user.clone())?;
        Ok(auth)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let response = self.http.post(self.url("/api/auth/login")).json(&body).send().await?;
        let auth: AuthResponse = Self::parse(response).await?;
        self.session.set(auth.token.clone(), auth.user.clone())?;
        Ok(auth)
    }

    /// Tokens are stateless, so logging out only drops the local session
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()
    }

    pub async fn profile(&self) -> Result<UserResponse, ClientError> {
        let request = self.authorized(self.http.get(self.url("/api/auth/profile")))?;
        let user: UserResponse = Self::parse(request.send().await?).await?;
        self.session.set_user(user.clone())?;
        Ok(user)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<ProfileResponse, ClientError> {
        let builder = self.authorized(self.http.put(self.url("/api/auth/profile")))?.json(request);
        let profile: ProfileResponse = Self::parse(builder.send().await?).await?;
        match &profile.token {
            Some(token) => self.session.set(token.clone(), profile.user.clone())?,
            None => self.session.set_user(profile.user.clone())?,
        }
        Ok(profile)
    }

    pub async fn list_properties(&self, query: &[(&str, &str)]) -> Result<Vec<PropertyResponse>, ClientError> {
        let request = self.maybe_authorized(self.http.get(self.url("/api/properties")).query(query));
        Self::parse(request.send().await?).await
    }

    pub async fn get_property(&self, id: &str) -> Result<PropertyResponse, ClientError> {
        let request = self.maybe_authorized(self.http.get(self.url(&format!("/api/properties/{}", id))));
        Self::parse(request.send().await?).await
    }

    pub async fn my_properties(&self) -> Result<Vec<PropertyResponse>, ClientError> {
        let request = self.authorized(self.http.get(self.url("/api/properties/user/my-properties")))?;
        Self::parse(request.send().await?).await
    }

    /// Text fields go in as sent; every image becomes an `images` part
    pub async fn create_property(&self, fields: &[(&str, &str)], images: Vec<ImageUpload>) -> Result<PropertyResponse, ClientError> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        for image in images {
            let part = Part::bytes(image.data)
                .file_name(image.file_name.unwrap_or_else(|| "image".to_string()))
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }
        let request = self.authorized(self.http.post(self.url("/api/properties")))?.multipart(form);
        Self::parse(request.send().await?).await
    }

    pub async fn subscribe(&self, email: &str) -> Result<MessageResponse, ClientError> {
        let body = SubscribeRequest { email: email.to_string() };
        let response = self.http.post(self.url("/api/subscribe")).json(&body).send().await?;
        Self::parse(response).await
    }
}
