pub mod auth_dto;
pub mod property_dto;
pub mod intake_dto;

use serde::{Deserialize, Deserializer};

/// Trims while deserializing so length rules see what gets stored
pub(crate) fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

pub(crate) fn trimmed_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()))
}
