/// Seams to the boat analysis and catalog services
///
/// Responses come back as loose JSON because the services do not agree on
/// one shape; `analysis` and `lookup` normalize them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::boats::lookup::LookupKey;
use crate::error::CapabilityError;
use crate::state::data::EncodedPayload;

/// Identifies the boat in an image
#[async_trait]
pub trait BoatAnalyzer: Send + Sync {
    async fn analyze_boat_image(&self, payload: &EncodedPayload) -> Result<Value, CapabilityError>;
}

/// Boat inventory
#[async_trait]
pub trait BoatCatalog: Send + Sync {
    /// Boats similar to the given key, most similar first (a JSON array)
    async fn find_similar(&self, key: &LookupKey) -> Result<Value, CapabilityError>;

    /// Full details for one boat; `None` if the id is unknown
    async fn boat_details(&self, id: &str) -> Result<Option<BoatDetails>, CapabilityError>;
}

/// Everything the detail screen shows about one boat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatDetails {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub manufacturer: String,
    pub year: u16,
    /// Length overall in feet
    pub length_ft: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<String>,
}
