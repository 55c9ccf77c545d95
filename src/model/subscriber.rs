use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Newsletter subscription; `email` carries a unique index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub created_at: Option<String>,
}
