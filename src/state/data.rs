/// Shared data structures for the compare workflow
///
/// These structs represent the data model that flows between
/// the workflow stages and the UI layer.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the user wants the boat image to come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Library,
    Camera,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Library => write!(f, "library"),
            SourceKind::Camera => write!(f, "camera"),
        }
    }
}

/// Reference to a locally available image picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageHandle {
    path: PathBuf,
}

impl RawImageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encoding of a transformed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Jpeg,
}

/// Bounded-size encoded image handed to the analysis capability
///
/// Always smaller than the file it was produced from, and never wider than
/// the configured maximum. A new transform yields a new payload.
#[derive(Clone, PartialEq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PayloadFormat,
    /// JPEG quality actually used (0.0, 1.0]
    pub quality_factor: f32,
    /// Size of the source file in bytes
    pub source_len: usize,
}

impl EncodedPayload {
    /// Base64 text of the payload bytes (what the analysis service expects)
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Keep the bytes out of logs and panics
impl fmt::Debug for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedPayload")
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("quality_factor", &self.quality_factor)
            .field("source_len", &self.source_len)
            .finish()
    }
}

/// Whether a result came from the external capability or was synthesized locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Real,
    Fallback,
}

/// Canonical boat classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Boat type, e.g. "Yacht"
    pub category: String,
    /// In [0, 1]; fallback results always carry 0.0
    pub confidence: f32,
    /// Visual features in the order reported
    pub attributes: Vec<String>,
    pub provenance: Provenance,
}

impl AnalysisResult {
    /// Category used when the analysis capability could not be reached.
    /// Must be a category the catalog knows, so lookup still finds boats.
    pub const FALLBACK_CATEGORY: &'static str = "Sailboat";
    /// Out-of-band confidence marking a synthesized result
    pub const FALLBACK_CONFIDENCE: f32 = 0.0;

    /// Locally synthesized result used when analysis fails
    pub fn fallback() -> Self {
        Self {
            category: Self::FALLBACK_CATEGORY.to_string(),
            confidence: Self::FALLBACK_CONFIDENCE,
            attributes: Vec::new(),
            provenance: Provenance::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }

    /// Confidence as a whole percentage for display
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// Summary of a boat comparable to the analyzed one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparableItem {
    /// Non-empty, unique within a set
    pub id: String,
    pub name: String,
    pub category: String,
    pub summary: String,
    /// Image URL or path, empty when the source had none
    pub image_ref: String,
}

/// Comparable boats, most relevant first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparableSet {
    pub items: Vec<ComparableItem>,
    pub provenance: Provenance,
}

impl ComparableSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Stage of the workflow, used for failures and error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Picking,
    Transforming,
    Analyzing,
    LookingUp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Picking => "picking",
            Stage::Transforming => "transforming",
            Stage::Analyzing => "analyzing",
            Stage::LookingUp => "looking_up",
        };
        f.write_str(name)
    }
}

/// The single live state of a compare session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Picking,
    Transforming(RawImageHandle),
    Analyzing(EncodedPayload),
    LookingUp(AnalysisResult),
    Ready(AnalysisResult, ComparableSet),
    /// Terminal until reset
    Failed { stage: Stage, message: String },
}

impl WorkflowState {
    /// Short name for logs and rejections
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Picking => "picking",
            WorkflowState::Transforming(_) => "transforming",
            WorkflowState::Analyzing(_) => "analyzing",
            WorkflowState::LookingUp(_) => "looking_up",
            WorkflowState::Ready(..) => "ready",
            WorkflowState::Failed { .. } => "failed",
        }
    }

    /// True while a stage is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Picking
                | WorkflowState::Transforming(_)
                | WorkflowState::Analyzing(_)
                | WorkflowState::LookingUp(_)
        )
    }

    /// Whether a new run may start from here
    pub fn accepts_selection(&self) -> bool {
        matches!(self, WorkflowState::Idle | WorkflowState::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_out_of_band() {
        let result = AnalysisResult::fallback();
        assert!(result.is_fallback());
        assert_eq!(result.category, "Sailboat");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.confidence_percent(), 0);
    }

    #[test]
    fn test_busy_states() {
        assert!(!WorkflowState::Idle.is_busy());
        assert!(WorkflowState::Picking.is_busy());
        assert!(WorkflowState::LookingUp(AnalysisResult::fallback()).is_busy());

        let failed = WorkflowState::Failed {
            stage: Stage::Picking,
            message: "denied".to_string(),
        };
        assert!(!failed.is_busy());
        assert!(failed.accepts_selection());
        assert!(!WorkflowState::Picking.accepts_selection());
    }

    #[test]
    fn test_payload_base64() {
        let payload = EncodedPayload {
            bytes: vec![0xFF, 0xD8, 0xFF],
            width: 1,
            height: 1,
            format: PayloadFormat::Jpeg,
            quality_factor: 0.7,
            source_len: 10,
        };
        assert_eq!(payload.to_base64(), "/9j/");
        // Debug output never dumps the bytes
        assert!(!format!("{:?}", payload).contains("255"));
    }

    #[test]
    fn test_analysis_result_json_shape() {
        let result = AnalysisResult {
            category: "Yacht".to_string(),
            confidence: 0.85,
            attributes: vec!["White hull".to_string()],
            provenance: Provenance::Real,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "Yacht");
        assert_eq!(json["provenance"], "real");
    }
}
