//! Entity records as produced by a data source and kept in the result store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A discovered entity (typically a business listing).
///
/// Identity is the display `name`: two records with the same name are the
/// same entity no matter how their other fields differ. Fields a data source
/// sends that are not modelled here are kept in `extra` so that rewriting a
/// store never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display name, the unique key
    pub name: String,

    /// Rating as displayed (e.g. "4.6/5")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,

    /// Review count as displayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<String>,

    /// Service or category descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Review texts in the order they were collected
    #[serde(default)]
    pub all_reviews: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityRecord {
    /// Create a record with only its key set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rating: None,
            reviews: None,
            service: None,
            website: None,
            address: None,
            phone: None,
            all_reviews: Vec::new(),
            extra: Map::new(),
        }
    }

    /// The identity key of this record.
    pub fn key(&self) -> &str {
        &self.name
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    pub fn with_reviews(mut self, reviews: impl Into<String>) -> Self {
        self.reviews = Some(reviews.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Append a review text.
    pub fn with_review(mut self, text: impl Into<String>) -> Self {
        self.all_reviews.push(text.into());
        self
    }

    /// Attach a field this type does not model.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
