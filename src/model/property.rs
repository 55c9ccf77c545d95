use bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Approval workflow state; only approved listings are public
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Pending => "Pending",
            PropertyStatus::Approved => "Approved",
            PropertyStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(PropertyStatus::Pending),
            "approved" => Some(PropertyStatus::Approved),
            "rejected" => Some(PropertyStatus::Rejected),
            _ => None,
        }
    }

    /// Status a listing ends up in after an edit. Non-admin edits always go back to review.
    pub fn after_edit(self, editor_is_admin: bool) -> Self {
        if editor_is_admin {
            self
        } else {
            PropertyStatus::Pending
        }
    }
}

fn default_furnishing() -> String {
    "Unfurnished".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub status: PropertyStatus,
    pub beds: u32,
    pub baths: u32,
    pub sqft: f64,
    #[serde(default = "default_furnishing")]
    pub furnishing: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub agent: Option<ObjectId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Property {
    pub fn is_public(&self) -> bool {
        self.status == PropertyStatus::Approved
    }
}

/// Search criteria for property listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub agent: Option<ObjectId>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_beds: Option<u32>,
}

impl PropertyFilter {
    pub fn approved_only() -> Self {
        PropertyFilter {
            status: Some(PropertyStatus::Approved),
            ..PropertyFilter::default()
        }
    }

    pub fn by_agent(agent: ObjectId) -> Self {
        PropertyFilter {
            agent: Some(agent),
            ..PropertyFilter::default()
        }
    }

    /// MongoDB query document equivalent of [`PropertyFilter::matches`]
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(agent) = self.agent {
            filter.insert("agent", agent);
        }
        if let Some(location) = &self.location {
            filter.insert("location", doc! { "$regex": regex::escape(location), "$options": "i" });
        }
        if let Some(property_type) = &self.property_type {
            filter.insert("type", property_type.as_str());
        }
        let mut price = Document::new();
        if let Some(min) = self.min_price {
            price.insert("$gte", min);
        }
        if let Some(max) = self.max_price {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            filter.insert("price", price);
        }
        if let Some(min_beds) = self.min_beds {
            filter.insert("beds", doc! { "$gte": i64::from(min_beds) });
        }
        filter
    }

    pub fn matches(&self, property: &Property) -> bool {
        if self.status.is_some_and(|status| property.status != status) {
            return false;
        }
        if self.agent.is_some() && property.agent != self.agent {
            return false;
        }
        if let Some(location) = &self.location {
            if !property.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        if self.property_type.as_ref().is_some_and(|t| &property.property_type != t) {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if self.min_beds.is_some_and(|min| property.beds < min) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Property {
        Property {
            id: Some(ObjectId::new()),
            title: "Luxury 3BHK Apartment".to_string(),
            description: "Corner unit".to_string(),
            price: 8_500_000.0,
            location: "Noida, Sector 75".to_string(),
            property_type: "For Sale".to_string(),
            status: PropertyStatus::Approved,
            beds: 3,
            baths: 2,
            sqft: 1650.0,
            furnishing: default_furnishing(),
            images: vec![],
            agent: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_after_edit() {
        assert_eq!(PropertyStatus::Approved.after_edit(false), PropertyStatus::Pending);
        assert_eq!(PropertyStatus::Rejected.after_edit(false), PropertyStatus::Pending);
        assert_eq!(PropertyStatus::Approved.after_edit(true), PropertyStatus::Approved);
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(PropertyStatus::parse("approved"), Some(PropertyStatus::Approved));
        assert_eq!(PropertyStatus::parse(" Rejected "), Some(PropertyStatus::Rejected));
        assert_eq!(PropertyStatus::parse("sold"), None);
    }

    #[test]
    fn test_filter_matches() {
        let property = sample();
        assert!(PropertyFilter::default().matches(&property));
        assert!(PropertyFilter::approved_only().matches(&property));

        let filter = PropertyFilter { location: Some("noida".to_string()), min_beds: Some(3), ..Default::default() };
        assert!(filter.matches(&property));

        let filter = PropertyFilter { max_price: Some(5_000_000.0), ..Default::default() };
        assert!(!filter.matches(&property));

        let filter = PropertyFilter { status: Some(PropertyStatus::Pending), ..Default::default() };
        assert!(!filter.matches(&property));

        let filter = PropertyFilter::by_agent(ObjectId::new());
        assert!(!filter.matches(&property));
    }

    #[test]
    fn test_filter_document_escapes_location() {
        let filter = PropertyFilter {
            status: Some(PropertyStatus::Approved),
            location: Some("Sector (75)".to_string()),
            min_price: Some(100.0),
            ..Default::default()
        };
        let doc = filter.to_document();
        assert_eq!(doc.get_str("status").unwrap(), "Approved");
        let location = doc.get_document("location").unwrap();
        assert_eq!(location.get_str("$regex").unwrap(), r"Sector \(75\)");
        assert_eq!(doc.get_document("price").unwrap().get_f64("$gte").unwrap(), 100.0);
        assert!(!doc.contains_key("beds"));
    }

    #[test]
    fn test_missing_furnishing_defaults() {
        let json = serde_json::json!({
            "title": "Cozy Studio Flat",
            "description": "Near the metro",
            "price": 4_500_000.0,
            "location": "Hinjewadi, Pune",
            "type": "For Rent",
            "beds": 1,
            "baths": 1,
            "sqft": 450.0,
            "agent": null,
            "createdAt": null,
            "updatedAt": null
        });
        let property: Property = serde_json::from_value(json).unwrap();
        assert_eq!(property.furnishing, "Unfurnished");
        assert_eq!(property.status, PropertyStatus::Pending);
        assert!(property.images.is_empty());
    }
}
