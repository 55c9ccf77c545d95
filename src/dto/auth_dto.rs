use crate::dto::{trimmed, trimmed_opt};
use crate::model::user::{User, UserRole};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Both fields are checked by hand so a missing one is a plain 400
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Public view of a user; the password hash never leaves the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            dob: user.dob.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserResponse,
    /// Present when name or email changed, since clients cache both
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_register_fields_fail_validation() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({"email": "a@x.com"})).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_names_are_trimmed_before_validation() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "  ", "email": "a@x.com", "password": "secret123"
        }))
        .unwrap();
        assert_eq!(req.name, "");
        assert!(req.validate().unwrap_err().field_errors().contains_key("name"));

        let req: UpdateProfileRequest = serde_json::from_value(serde_json::json!({ "name": " Asha " })).unwrap();
        assert_eq!(req.name.as_deref(), Some("Asha"));
        let req: UpdateProfileRequest = serde_json::from_value(serde_json::json!({ "phone": null })).unwrap();
        assert_eq!(req.name, None);
    }

    #[test]
    fn test_profile_patch_only_validates_present_fields() {
        let req = UpdateProfileRequest { phone: Some("+91 98765 43210".into()), ..Default::default() };
        assert!(req.validate().is_ok());

        let req = UpdateProfileRequest { email: Some("not-an-email".into()), ..Default::default() };
        assert!(req.validate().is_err());
    }
}
