/// Comparable lookup stage
///
/// Finds boats comparable to an analysis result. Like the analysis invoker
/// it never fails: errors are reported and a fixed fallback set is returned,
/// so the UI always has something to show once the workflow is Ready.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::boats::capability::BoatCatalog;
use crate::error::CapabilityError;
use crate::report::ErrorReporter;
use crate::state::data::{AnalysisResult, ComparableItem, ComparableSet, Provenance, Stage};

/// Catalog key for a boat category, e.g. "Fishing Boat" → `fishing_boat`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    /// Derived from the category only, so real and fallback results with the
    /// same category map to the same key.
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self::from_category(&result.category)
    }

    pub fn from_category(category: &str) -> Self {
        let key = category
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ComparableLookup {
    catalog: Arc<dyn BoatCatalog>,
    reporter: Arc<dyn ErrorReporter>,
    timeout: Duration,
}

impl ComparableLookup {
    pub fn new(
        catalog: Arc<dyn BoatCatalog>,
        reporter: Arc<dyn ErrorReporter>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            reporter,
            timeout,
        }
    }

    /// Comparable boats for the result's category. Never fails.
    pub async fn lookup(&self, result: &AnalysisResult) -> ComparableSet {
        let key = LookupKey::from_result(result);

        match self.try_lookup(&key).await {
            Ok(set) => {
                tracing::info!("⚓ {} comparable boats for '{}'", set.len(), key);
                set
            }
            Err(error) => {
                self.reporter.report(Stage::LookingUp, &error);
                fallback_set()
            }
        }
    }

    async fn try_lookup(&self, key: &LookupKey) -> Result<ComparableSet, CapabilityError> {
        let raw = tokio::time::timeout(self.timeout, self.catalog.find_similar(key))
            .await
            .map_err(|_| CapabilityError::TimedOut(self.timeout))??;

        normalize_items(&raw, key)
    }
}

/// Turn a catalog response into a comparable set.
///
/// Entries without an id or a name are skipped; a repeated id keeps its
/// first (most relevant) occurrence. A non-empty list with no usable entry
/// is malformed.
pub fn normalize_items(raw: &Value, key: &LookupKey) -> Result<ComparableSet, CapabilityError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| CapabilityError::Malformed("similar boats response is not a list".into()))?;

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for entry in entries {
        let Some(object) = entry.as_object() else {
            tracing::debug!("skipping non-object catalog entry");
            skipped += 1;
            continue;
        };
        let Some(item) = to_item(object, key) else {
            tracing::debug!("skipping catalog entry without id or name");
            skipped += 1;
            continue;
        };
        if seen.insert(item.id.clone()) {
            items.push(item);
        }
    }

    // An empty list is a real answer; a list of nothing usable is not
    if items.is_empty() && skipped > 0 {
        return Err(CapabilityError::Malformed(format!(
            "none of the {} similar boats entries has an id and a name",
            skipped
        )));
    }

    Ok(ComparableSet {
        items,
        provenance: Provenance::Real,
    })
}

fn to_item(object: &Map<String, Value>, key: &LookupKey) -> Option<ComparableItem> {
    let id = match object.get("id")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let name = text(object, &["name"])?;
    if id.is_empty() {
        return None;
    }

    let image_ref = text(object, &["imageRef", "image"]).or_else(|| {
        object
            .get("images")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    Some(ComparableItem {
        id,
        name,
        category: text(object, &["category", "type"]).unwrap_or_else(|| key.to_string()),
        summary: text(object, &["summary", "description"]).unwrap_or_default(),
        image_ref: image_ref.unwrap_or_default(),
    })
}

/// First non-empty string under any of `keys`
fn text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Fixed set shown when the catalog cannot be reached.
/// Same size and order every time.
pub fn fallback_set() -> ComparableSet {
    let item = |id: &str, name: &str, category: &str, summary: &str, image_ref: &str| ComparableItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        summary: summary.to_string(),
        image_ref: image_ref.to_string(),
    };

    ComparableSet {
        items: vec![
            item(
                "sample-bay-cruiser-240",
                "Bay Cruiser 240",
                "Sailboat",
                "A beautiful sailboat perfect for bay cruising",
                "https://source.unsplash.com/random/300x200/?sailboat",
            ),
            item(
                "sample-ocean-master-340",
                "Ocean Master 340",
                "Sailboat",
                "Designed for open water sailing with comfort",
                "https://source.unsplash.com/random/300x200/?yacht",
            ),
            item(
                "sample-harbor-runner-22",
                "Harbor Runner 22",
                "Motorboat",
                "A nimble day boat for harbor and coastal runs",
                "https://source.unsplash.com/random/300x200/?motorboat",
            ),
        ],
        provenance: Provenance::Fallback,
    }
}
