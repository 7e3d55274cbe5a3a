/// Bundled stand-ins for the analysis and catalog services
///
/// No real recognition happens here: the analyzer derives a boat type from
/// a checksum of the payload, and the catalog serves a small inventory
/// compiled into the binary.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::time::Duration;

use crate::boats::capability::{BoatAnalyzer, BoatCatalog, BoatDetails};
use crate::boats::lookup::LookupKey;
use crate::error::CapabilityError;
use crate::state::data::EncodedPayload;

/// Inventory shipped with the app
const BUNDLED_INVENTORY: &str = include_str!("../../assets/inventory.json");

/// Boat types the mock analyzer can report, with typical features
const BOAT_TYPES: &[(&str, &[&str])] = &[
    ("Yacht", &["White hull", "Two decks", "Flybridge"]),
    ("Sailboat", &["Single mast", "Furled jib", "White hull"]),
    ("Motorboat", &["Outboard engine", "Planing hull"]),
    ("Fishing Boat", &["Rod holders", "Center console"]),
    ("Pontoon", &["Twin pontoons", "Flat deck", "Bimini top"]),
    ("Jet Ski", &["Straddle seat", "Handlebars"]),
];

/// Analyzer that guesses a boat type from the payload bytes
#[derive(Debug, Default, Clone)]
pub struct MockAnalyzer {
    latency: Duration,
}

impl MockAnalyzer {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl BoatAnalyzer for MockAnalyzer {
    async fn analyze_boat_image(&self, payload: &EncodedPayload) -> Result<Value, CapabilityError> {
        if payload.is_empty() {
            return Err(CapabilityError::Unavailable("empty image payload".into()));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        // Hash the wire form so the answer is stable for the same image
        let checksum = payload
            .to_base64()
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));

        let (boat_type, features) = BOAT_TYPES[checksum as usize % BOAT_TYPES.len()];
        let confidence = 0.60 + f64::from((checksum / 7) % 36) / 100.0;

        Ok(json!({
            "boatType": boat_type,
            "confidence": confidence,
            "features": features,
        }))
    }
}

/// One inventory record: the detail view plus listing fields
#[derive(Debug, Clone, Deserialize)]
struct InventoryEntry {
    #[serde(flatten)]
    details: BoatDetails,
    #[serde(default)]
    image: String,
    similarity: f32,
}

/// Catalog backed by an in-memory inventory
#[derive(Debug, Clone)]
pub struct MockCatalog {
    inventory: Vec<InventoryEntry>,
    latency: Duration,
}

impl MockCatalog {
    /// Inventory compiled into the binary
    pub fn bundled(latency: Duration) -> Result<Self, CapabilityError> {
        Self::from_json(BUNDLED_INVENTORY, latency)
    }

    pub fn from_json(json: &str, latency: Duration) -> Result<Self, CapabilityError> {
        let inventory = serde_json::from_str(json)
            .map_err(|e| CapabilityError::Malformed(format!("inventory: {}", e)))?;
        let catalog = Self { inventory, latency };
        if catalog.is_empty() {
            return Err(CapabilityError::Malformed("inventory holds no boats".into()));
        }
        Ok(catalog)
    }

    /// Number of boats in the inventory
    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl BoatCatalog for MockCatalog {
    async fn find_similar(&self, key: &LookupKey) -> Result<Value, CapabilityError> {
        self.simulate_latency().await;

        let mut matches: Vec<&InventoryEntry> = self
            .inventory
            .iter()
            .filter(|entry| LookupKey::from_category(&entry.details.category) == *key)
            .collect();

        // Stable sort keeps inventory order for equal scores
        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });

        let listing = matches
            .into_iter()
            .map(|entry| {
                json!({
                    "id": entry.details.id,
                    "name": entry.details.name,
                    "type": entry.details.category,
                    "description": entry.details.description,
                    "image": entry.image,
                    "similarity": entry.similarity,
                })
            })
            .collect();

        Ok(Value::Array(listing))
    }

    async fn boat_details(&self, id: &str) -> Result<Option<BoatDetails>, CapabilityError> {
        self.simulate_latency().await;

        Ok(self
            .inventory
            .iter()
            .find(|entry| entry.details.id == id)
            .map(|entry| entry.details.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boats::analysis::normalize_analysis;
    use crate::boats::lookup::{fallback_set, normalize_items};
    use crate::state::data::PayloadFormat;

    fn payload(bytes: Vec<u8>) -> EncodedPayload {
        EncodedPayload {
            bytes,
            width: 10,
            height: 10,
            format: PayloadFormat::Jpeg,
            quality_factor: 0.7,
            source_len: 4096,
        }
    }

    #[tokio::test]
    async fn test_analyzer_is_stable_and_normalizable() {
        let analyzer = MockAnalyzer::default();
        let image = payload((0..=255).collect());

        let first = analyzer.analyze_boat_image(&image).await.unwrap();
        let second = analyzer.analyze_boat_image(&image).await.unwrap();
        assert_eq!(first, second);

        let result = normalize_analysis(&first).unwrap();
        assert!(BOAT_TYPES.iter().any(|(name, _)| *name == result.category));
        assert!((0.60..=0.95).contains(&result.confidence));
        assert!(!result.attributes.is_empty());
    }

    #[tokio::test]
    async fn test_analyzer_rejects_empty_payload() {
        let err = MockAnalyzer::default()
            .analyze_boat_image(&payload(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::Unavailable(_)));
    }

    #[test]
    fn test_bundled_inventory_parses() {
        let catalog = MockCatalog::bundled(Duration::ZERO).unwrap();
        assert_eq!(catalog.len(), 13);
    }

    #[tokio::test]
    async fn test_every_boat_type_has_comparables() {
        let catalog = MockCatalog::bundled(Duration::ZERO).unwrap();
        for (boat_type, _) in BOAT_TYPES {
            let key = LookupKey::from_category(boat_type);
            let raw = catalog.find_similar(&key).await.unwrap();
            let set = normalize_items(&raw, &key).unwrap();
            assert!(!set.is_empty(), "no comparables for {}", boat_type);
        }
    }

    #[tokio::test]
    async fn test_similar_sorted_by_similarity() {
        let catalog = MockCatalog::bundled(Duration::ZERO).unwrap();
        let raw = catalog
            .find_similar(&LookupKey::from_category("Sailboat"))
            .await
            .unwrap();

        let scores: Vec<f64> = raw
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["similarity"].as_f64().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_unknown_category_is_empty() {
        let catalog = MockCatalog::bundled(Duration::ZERO).unwrap();
        let raw = catalog
            .find_similar(&LookupKey::from_category("Submarine"))
            .await
            .unwrap();
        assert_eq!(raw, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn test_fallback_items_have_details() {
        let catalog = MockCatalog::bundled(Duration::ZERO).unwrap();
        for item in fallback_set().items {
            let details = catalog.boat_details(&item.id).await.unwrap();
            assert_eq!(details.map(|d| d.name), Some(item.name));
        }
    }

    #[tokio::test]
    async fn test_unknown_boat_details() {
        let catalog = MockCatalog::bundled(Duration::ZERO).unwrap();
        assert_eq!(catalog.boat_details("no-such-boat").await.unwrap(), None);
    }

    #[test]
    fn test_bad_inventory() {
        let err = MockCatalog::from_json("{\"not\": \"a list\"}", Duration::ZERO).unwrap_err();
        assert!(matches!(err, CapabilityError::Malformed(_)));

        let err = MockCatalog::from_json("[]", Duration::ZERO).unwrap_err();
        assert_eq!(err, CapabilityError::Malformed("inventory holds no boats".into()));
    }
}
