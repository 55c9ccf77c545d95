use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub role: UserRole,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Identity of the caller behind a verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: ObjectId,
    pub role: UserRole,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins may act on anything; everyone else only on what they own.
    pub fn can_manage(&self, owner: Option<&ObjectId>) -> bool {
        self.is_admin() || owner == Some(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_round_trips() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("agent"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_caller_can_manage() {
        let owner = ObjectId::new();
        let user = Caller { id: owner, role: UserRole::User };
        let stranger = Caller { id: ObjectId::new(), role: UserRole::User };
        let admin = Caller { id: ObjectId::new(), role: UserRole::Admin };

        assert!(user.can_manage(Some(&owner)));
        assert!(!stranger.can_manage(Some(&owner)));
        assert!(!stranger.can_manage(None));
        assert!(admin.can_manage(Some(&owner)));
        assert!(admin.can_manage(None));
    }
}
