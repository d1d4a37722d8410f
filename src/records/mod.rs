//! Business record type and its natural key
//!
//! One record per extracted business listing. Fields the directory does not
//! provide stay empty strings so the CSV output never carries sentinel values.

use serde::{Deserialize, Serialize};

/// CSV column order for records files; stable across runs and shards
pub const CSV_COLUMNS: [&str; 14] = [
    "business_name",
    "street_address",
    "city",
    "state",
    "postal_code",
    "phone",
    "email",
    "website",
    "entity_type",
    "business_started",
    "incorporated_date",
    "principal_contact",
    "business_categories",
    "source_url",
];

/// One extracted business listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub business_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub entity_type: String,
    pub business_started: String,
    pub incorporated_date: String,
    pub principal_contact: String,
    pub business_categories: String,
    pub source_url: String,
}

impl BusinessRecord {
    /// Natural key identifying the same business across pages, runs, and shards
    ///
    /// Lowercased (name, address, city, state); used for intra-city dedupe and
    /// the offline merge pass.
    pub fn natural_key(&self) -> (String, String, String, String) {
        (
            self.business_name.trim().to_lowercase(),
            self.street_address.trim().to_lowercase(),
            self.city.trim().to_lowercase(),
            self.state.trim().to_lowercase(),
        )
    }

    /// Field values in [`CSV_COLUMNS`] order
    pub fn to_fields(&self) -> [&str; 14] {
        [
            &self.business_name,
            &self.street_address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.phone,
            &self.email,
            &self.website,
            &self.entity_type,
            &self.business_started,
            &self.incorporated_date,
            &self.principal_contact,
            &self.business_categories,
            &self.source_url,
        ]
    }
}
