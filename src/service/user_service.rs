use tracing::{info, warn, instrument};
use crate::config::AdminUserConfig;
use crate::dto::auth_dto::{AuthResponse, ProfileResponse, RegisterRequest, UpdateProfileRequest, UserResponse};
use crate::dto::intake_dto::MessageResponse;
use crate::model::user::{Caller, User, UserRole};
use crate::repository::user_repo::UserRepository;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::jwt::JwtTokenUtils;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use async_trait::async_trait;
use std::sync::Arc;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse>;
    async fn login(&self, email: String, password: String) -> ServiceResult<AuthResponse>;
    /// Sets a new password with no proof of mailbox ownership
    async fn reset_password(&self, email: String, new_password: String) -> ServiceResult<MessageResponse>;
    async fn get_profile(&self, caller: Caller) -> ServiceResult<UserResponse>;
    async fn update_profile(&self, caller: Caller, request: UpdateProfileRequest) -> ServiceResult<ProfileResponse>;
    async fn list_users(&self) -> ServiceResult<Vec<UserResponse>>;
    /// Creates the configured admin unless the email is already taken; true when created
    async fn seed_admin(&self, config: &AdminUserConfig) -> ServiceResult<bool>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_utils: Arc<dyn JwtTokenUtils>) -> Self {
        Self { user_repo, jwt_utils }
    }

    fn issue_token(&self, user: &User) -> ServiceResult<String> {
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without id".to_string()))?;
        Ok(self.jwt_utils.generate_token(&id, user.role)?)
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.user_repo.find_by_email(email).await?)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Argon2 is CPU bound; keep it off the async workers
async fn hash_password(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || PasswordUtilsImpl::hash_password(&password))
        .await
        .map_err(|e| ServiceError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(ServiceError::from)
}

async fn verify_password(password: String, hash: Option<String>) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => PasswordUtilsImpl::verify_password(&password, &hash),
        None => {
            PasswordUtilsImpl::verify_dummy(&password);
            Ok(false)
        }
    })
    .await
    .map_err(|e| ServiceError::InternalError(format!("Verification task failed: {}", e)))?
    .map_err(ServiceError::from)
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => UserRole::User,
            Some(raw) => match UserRole::parse(&raw.to_lowercase()) {
                Some(UserRole::User) => UserRole::User,
                Some(UserRole::Admin) => {
                    warn!("Rejected self-registration as admin");
                    return Err(ServiceError::Forbidden("Cannot register as admin".to_string()));
                }
                None => return Err(ServiceError::InvalidInput(format!("Unknown role: {}", raw))),
            },
        };

        let email = normalize_email(&request.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let user = User {
            id: None,
            name: request.name.trim().to_string(),
            email,
            password_hash: hash_password(request.password).await?,
            role,
            phone: request.phone.filter(|p| !p.trim().is_empty()),
            dob: None,
            created_at: None,
            updated_at: None,
        };
        let inserted = self.user_repo.insert(user).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => ServiceError::Conflict("User already exists".to_string()),
            other => other,
        })?;

        info!("User registered");
        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            token: self.issue_token(&inserted)?,
            user: UserResponse::from(&inserted),
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> ServiceResult<AuthResponse> {
        let user = self.find_by_email(&normalize_email(&email)).await?;
        let valid = verify_password(password, user.as_ref().map(|u| u.password_hash.clone())).await?;

        match user {
            Some(user) if valid => {
                info!("User logged in");
                Ok(AuthResponse {
                    message: "Login successful".to_string(),
                    token: self.issue_token(&user)?,
                    user: UserResponse::from(&user),
                })
            }
            _ => {
                warn!("Failed login attempt");
                Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    #[instrument(skip(self, new_password), fields(email = %email))]
    async fn reset_password(&self, email: String, new_password: String) -> ServiceResult<MessageResponse> {
        warn!("Unverified password reset requested");
        let mut user = self.find_by_email(&normalize_email(&email)).await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without id".to_string()))?;

        user.password_hash = hash_password(new_password).await?;
        self.user_repo.update(id, user).await?;
        info!("Password reset");
        Ok(MessageResponse::ok("Password reset successfully"))
    }

    #[instrument(skip(self), fields(user = %caller.id))]
    async fn get_profile(&self, caller: Caller) -> ServiceResult<UserResponse> {
        let user = self.user_repo.find_by_id(&caller.id).await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(UserResponse::from(&user))
    }

    #[instrument(skip(self, request), fields(user = %caller.id))]
    async fn update_profile(&self, caller: Caller, request: UpdateProfileRequest) -> ServiceResult<ProfileResponse> {
        let mut user = self.user_repo.find_by_id(&caller.id).await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let mut identity_changed = false;

        if let Some(name) = request.name.map(|n| n.trim().to_string()) {
            identity_changed |= name != user.name;
            user.name = name;
        }
        if let Some(email) = request.email.as_deref().map(normalize_email) {
            if email != user.email {
                if let Some(other) = self.find_by_email(&email).await? {
                    if other.id != Some(caller.id) {
                        return Err(ServiceError::Conflict("Email is already in use".to_string()));
                    }
                }
                identity_changed = true;
                user.email = email;
            }
        }
        if let Some(phone) = request.phone {
            user.phone = Some(phone.trim().to_string()).filter(|p| !p.is_empty());
        }
        if let Some(dob) = request.dob {
            user.dob = Some(dob.trim().to_string()).filter(|d| !d.is_empty());
        }
        if let Some(password) = request.password {
            user.password_hash = hash_password(password).await?;
        }

        let updated = self.user_repo.update(caller.id, user).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => ServiceError::Conflict("Email is already in use".to_string()),
            other => other,
        })?;
        let token = if identity_changed { Some(self.issue_token(&updated)?) } else { None };

        info!(identity_changed, "Profile updated");
        Ok(ProfileResponse {
            message: "Profile updated successfully".to_string(),
            user: UserResponse::from(&updated),
            token,
        })
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> ServiceResult<Vec<UserResponse>> {
        let users = self.user_repo.list().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self, config), fields(email = %config.email))]
    async fn seed_admin(&self, config: &AdminUserConfig) -> ServiceResult<bool> {
        let email = normalize_email(&config.email);
        if let Some(existing) = self.find_by_email(&email).await? {
            if existing.role != UserRole::Admin {
                warn!("Seed admin email belongs to a non-admin user, leaving it untouched");
            }
            return Ok(false);
        }

        let admin = User {
            id: None,
            name: config.name.clone(),
            email,
            password_hash: hash_password(config.password.clone()).await?,
            role: UserRole::Admin,
            phone: None,
            dob: None,
            created_at: None,
            updated_at: None,
        };
        self.user_repo.insert(admin).await?;
        info!("Admin user created");
        Ok(true)
    }
}
