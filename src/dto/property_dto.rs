use crate::model::property::{Property, PropertyFilter, PropertyStatus};
use crate::model::user::User;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An image part from a multipart property form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased extension with a leading dot, taken from the client filename
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// Raw text fields of the multipart form, as sent
#[derive(Debug, Clone, Default)]
pub struct PropertyForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub sqft: Option<String>,
    pub furnishing: Option<String>,
}

/// Every field optional; used for both create and update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub beds: Option<u32>,
    pub baths: Option<u32>,
    pub sqft: Option<f64>,
    pub furnishing: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub property_type: String,
    pub beds: u32,
    pub baths: u32,
    pub sqft: f64,
    pub furnishing: Option<String>,
}

impl PropertyForm {
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "price" => &mut self.price,
            "location" => &mut self.location,
            "type" => &mut self.property_type,
            "beds" => &mut self.beds,
            "baths" => &mut self.baths,
            "sqft" => &mut self.sqft,
            "furnishing" => &mut self.furnishing,
            _ => return,
        };
        let value = value.trim().to_string();
        *slot = (!value.is_empty()).then_some(value);
    }

    /// Strings and numbers fill the form; arrays, objects and nulls are ignored
    pub fn from_json(body: Map<String, Value>) -> Self {
        let mut form = PropertyForm::default();
        for (name, value) in body {
            match value {
                Value::String(text) => form.set(&name, text),
                Value::Number(number) => form.set(&name, number.to_string()),
                _ => {}
            }
        }
        form
    }

    pub fn into_patch(self) -> Result<PropertyPatch, String> {
        Ok(PropertyPatch {
            price: parse_number("price", self.price.as_deref())?,
            beds: parse_count("beds", self.beds.as_deref())?,
            baths: parse_count("baths", self.baths.as_deref())?,
            sqft: parse_number("sqft", self.sqft.as_deref())?,
            title: self.title,
            description: self.description,
            location: self.location,
            property_type: self.property_type,
            furnishing: self.furnishing,
        })
    }

    pub fn into_new_property(self) -> Result<NewProperty, String> {
        let patch = self.into_patch()?;
        let mut missing = Vec::new();
        if patch.title.is_none() { missing.push("title"); }
        if patch.description.is_none() { missing.push("description"); }
        if patch.price.is_none() { missing.push("price"); }
        if patch.location.is_none() { missing.push("location"); }
        if patch.property_type.is_none() { missing.push("type"); }
        if patch.beds.is_none() { missing.push("beds"); }
        if patch.baths.is_none() { missing.push("baths"); }
        if patch.sqft.is_none() { missing.push("sqft"); }
        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }

        Ok(NewProperty {
            title: patch.title.unwrap_or_default(),
            description: patch.description.unwrap_or_default(),
            price: patch.price.unwrap_or_default(),
            location: patch.location.unwrap_or_default(),
            property_type: patch.property_type.unwrap_or_default(),
            beds: patch.beds.unwrap_or_default(),
            baths: patch.baths.unwrap_or_default(),
            sqft: patch.sqft.unwrap_or_default(),
            furnishing: patch.furnishing,
        })
    }
}

fn parse_number(field: &str, raw: Option<&str>) -> Result<Option<f64>, String> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
            _ => Err(format!("{} must be a non-negative number", field)),
        },
    }
}

fn parse_count(field: &str, raw: Option<&str>) -> Result<Option<u32>, String> {
    raw.map(|raw| raw.parse::<u32>().map_err(|_| format!("{} must be a whole number", field)))
        .transpose()
}

impl PropertyPatch {
    pub fn apply(self, property: &mut Property) {
        if let Some(title) = self.title { property.title = title; }
        if let Some(description) = self.description { property.description = description; }
        if let Some(price) = self.price { property.price = price; }
        if let Some(location) = self.location { property.location = location; }
        if let Some(property_type) = self.property_type { property.property_type = property_type; }
        if let Some(beds) = self.beds { property.beds = beds; }
        if let Some(baths) = self.baths { property.baths = baths; }
        if let Some(sqft) = self.sqft { property.sqft = sqft; }
        if let Some(furnishing) = self.furnishing { property.furnishing = furnishing; }
    }
}

/// Query string of `GET /api/properties`. Values stay strings so a bad number is a JSON 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    pub status: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_beds: Option<String>,
    /// Legacy flag; privilege comes from the token only
    #[allow(dead_code)]
    pub admin: Option<String>,
}

impl PropertyQuery {
    pub fn into_filter(self, caller_is_admin: bool) -> Result<PropertyFilter, String> {
        let status = if caller_is_admin {
            match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
                Some(raw) => Some(PropertyStatus::parse(raw).ok_or_else(|| format!("Unknown status: {}", raw))?),
                None => None,
            }
        } else {
            Some(PropertyStatus::Approved)
        };

        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(PropertyFilter {
            status,
            agent: None,
            location: non_empty(self.location),
            property_type: non_empty(self.property_type),
            min_price: parse_number("minPrice", non_empty(self.min_price).as_deref())?,
            max_price: parse_number("maxPrice", non_empty(self.max_price).as_deref())?,
            min_beds: parse_count("minBeds", non_empty(self.min_beds).as_deref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for AgentSummary {
    fn from(user: &User) -> Self {
        AgentSummary {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub status: PropertyStatus,
    pub beds: u32,
    pub baths: u32,
    pub sqft: f64,
    pub furnishing: String,
    pub images: Vec<String>,
    /// Populated agent; null when unset or the user no longer exists
    pub agent: Option<AgentSummary>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl PropertyResponse {
    pub fn new(property: Property, agent: Option<AgentSummary>) -> Self {
        PropertyResponse {
            id: property.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: property.title,
            description: property.description,
            price: property.price,
            location: property.location,
            property_type: property.property_type,
            status: property.status,
            beds: property.beds,
            baths: property.baths,
            sqft: property.sqft,
            furnishing: property.furnishing,
            images: property.images,
            agent,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}
