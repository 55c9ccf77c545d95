use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;
use crate::config::JwtConfig;
use crate::model::user::{Caller, UserRole};
use bson::oid::ObjectId;

/// Bearer token payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (hex ObjectId)
    pub id: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn caller(&self) -> Result<Caller, JwtError> {
        let id = ObjectId::parse_str(&self.id).map_err(|_| JwtError::InvalidToken)?;
        Ok(Caller { id, role: self.role })
    }
}

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
}

pub trait JwtTokenUtils: Send + Sync {
    fn generate_token(&self, user_id: &ObjectId, role: UserRole) -> Result<String, JwtError>;
    fn validate_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header<'a>(&self, auth_header: &'a str) -> Result<&'a str, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_token(&self, user_id: &ObjectId, role: UserRole) -> Result<String, JwtError> {
        debug!("Generating token for user: {} with role: {}", user_id, role);

        let now = Utc::now();
        let expiration = now + Duration::minutes(self.jwt_config.expiration_minutes);
        let claims = Claims {
            id: user_id.to_hex(),
            role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).map_err(|err| {
            error!("Failed to encode JWT token: {}", err);
            JwtError::EncodingFailed(err.to_string())
        })
    }

    fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                warn!("Rejected expired token");
                Err(JwtError::TokenExpired)
            }
            Err(err) => {
                warn!("Failed to decode JWT token: {}", err);
                Err(JwtError::DecodingFailed(err.to_string()))
            }
        }
    }

    fn extract_token_from_header<'a>(&self, auth_header: &'a str) -> Result<&'a str, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(JwtError::InvalidToken)?;

        if token.is_empty() {
            return Err(JwtError::InvalidToken);
        }
        Ok(token)
    }
}
