/// Analysis invoker
///
/// Calls the analyzer with a deadline and always comes back with an
/// `AnalysisResult`. Anything that goes wrong is reported and replaced by
/// `AnalysisResult::fallback()`, so the UI only ever has to show a
/// lower-quality result, never an analysis error.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::boats::capability::BoatAnalyzer;
use crate::error::CapabilityError;
use crate::report::ErrorReporter;
use crate::state::data::{AnalysisResult, EncodedPayload, Provenance, Stage};

/// Keys that may hold the boat category, in priority order
const CATEGORY_KEYS: &[&str] = &["category", "boatType", "type", "label"];

/// Keys that may hold the attribute list
const ATTRIBUTE_KEYS: &[&str] = &["attributes", "features"];

pub struct AnalysisInvoker {
    analyzer: Arc<dyn BoatAnalyzer>,
    reporter: Arc<dyn ErrorReporter>,
    timeout: Duration,
}

impl AnalysisInvoker {
    pub fn new(
        analyzer: Arc<dyn BoatAnalyzer>,
        reporter: Arc<dyn ErrorReporter>,
        timeout: Duration,
    ) -> Self {
        Self {
            analyzer,
            reporter,
            timeout,
        }
    }

    /// Classify the payload. Never fails.
    pub async fn analyze(&self, payload: &EncodedPayload) -> AnalysisResult {
        match self.try_analyze(payload).await {
            Ok(result) => {
                tracing::info!(
                    "🔍 analysis: {} ({}%)",
                    result.category,
                    result.confidence_percent()
                );
                result
            }
            Err(error) => {
                self.reporter.report(Stage::Analyzing, &error);
                AnalysisResult::fallback()
            }
        }
    }

    async fn try_analyze(&self, payload: &EncodedPayload) -> Result<AnalysisResult, CapabilityError> {
        tracing::debug!(bytes = payload.len(), width = payload.width, "sending payload for analysis");
        let raw = tokio::time::timeout(self.timeout, self.analyzer.analyze_boat_image(payload))
            .await
            .map_err(|_| CapabilityError::TimedOut(self.timeout))??;

        normalize_analysis(&raw)
    }
}

/// Turn any of the known response shapes into the canonical result.
///
/// Accepts an object, or a JSON string holding one. Confidence may be a
/// fraction or a percentage.
pub fn normalize_analysis(raw: &Value) -> Result<AnalysisResult, CapabilityError> {
    let parsed;
    let object = match raw {
        Value::Object(object) => object,
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|e| CapabilityError::Malformed(format!("analysis text is not JSON: {}", e)))?;
            parsed
                .as_object()
                .ok_or_else(|| CapabilityError::Malformed("analysis text is not an object".into()))?
        }
        other => {
            return Err(CapabilityError::Malformed(format!(
                "expected an object, got {}",
                json_kind(other)
            )))
        }
    };

    let category = first_string(object, CATEGORY_KEYS)
        .ok_or_else(|| CapabilityError::Malformed("no boat category in response".into()))?;

    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| CapabilityError::Malformed("no numeric confidence in response".into()))?;

    let attributes = ATTRIBUTE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(AnalysisResult {
        category,
        confidence: normalize_confidence(confidence)?,
        attributes,
        provenance: Provenance::Real,
    })
}

/// Fractions pass through; (1, 100] is read as a percentage
fn normalize_confidence(value: f64) -> Result<f32, CapabilityError> {
    if !value.is_finite() || value < 0.0 || value > 100.0 {
        return Err(CapabilityError::Malformed(format!(
            "confidence {} out of range",
            value
        )));
    }
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    Ok(fraction as f32)
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportLog;
    use crate::state::data::PayloadFormat;
    use async_trait::async_trait;
    use serde_json::json;

    enum Behaviour {
        Respond(Value),
        Fail(CapabilityError),
        Hang,
    }

    struct StubAnalyzer(Behaviour);

    #[async_trait]
    impl BoatAnalyzer for StubAnalyzer {
        async fn analyze_boat_image(&self, _payload: &EncodedPayload) -> Result<Value, CapabilityError> {
            match &self.0 {
                Behaviour::Respond(value) => Ok(value.clone()),
                Behaviour::Fail(error) => Err(error.clone()),
                Behaviour::Hang => std::future::pending().await,
            }
        }
    }

    fn payload() -> EncodedPayload {
        EncodedPayload {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 1,
            height: 1,
            format: PayloadFormat::Jpeg,
            quality_factor: 0.7,
            source_len: 100,
        }
    }

    fn invoker(behaviour: Behaviour) -> (AnalysisInvoker, Arc<ReportLog>) {
        let log = Arc::new(ReportLog::new());
        let invoker = AnalysisInvoker::new(
            Arc::new(StubAnalyzer(behaviour)),
            log.clone(),
            Duration::from_secs(10),
        );
        (invoker, log)
    }

    #[tokio::test]
    async fn test_real_result() {
        let (invoker, log) = invoker(Behaviour::Respond(json!({
            "boatType": "Yacht",
            "confidence": 0.85,
            "features": ["White hull", "Two decks", "Sail"]
        })));

        let result = invoker.analyze(&payload()).await;

        assert_eq!(result.category, "Yacht");
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.attributes, vec!["White hull", "Two decks", "Sail"]);
        assert_eq!(result.provenance, Provenance::Real);
        assert!(log.latest().is_none());
    }

    #[tokio::test]
    async fn test_failure_degrades_to_fallback() {
        let (invoker, log) = invoker(Behaviour::Fail(CapabilityError::Unavailable(
            "connection refused".into(),
        )));

        let result = invoker.analyze(&payload()).await;

        assert_eq!(result, AnalysisResult::fallback());
        let report = log.latest().unwrap();
        assert_eq!(report.stage, Stage::Analyzing);
        assert!(report.message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_response_degrades_to_fallback() {
        let (invoker, log) = invoker(Behaviour::Respond(json!(["not", "an", "object"])));

        let result = invoker.analyze(&payload()).await;

        assert!(result.is_fallback());
        assert!(log.latest().unwrap().message.contains("Malformed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_fallback() {
        let (invoker, log) = invoker(Behaviour::Hang);

        let result = invoker.analyze(&payload()).await;

        assert!(result.is_fallback());
        assert_eq!(
            log.latest().unwrap().message,
            CapabilityError::TimedOut(Duration::from_secs(10)).to_string()
        );
    }

    #[test]
    fn test_normalize_canonical_shape() {
        let result = normalize_analysis(&json!({
            "category": "Pontoon",
            "confidence": 0.5,
            "attributes": ["Flat deck"]
        }))
        .unwrap();
        assert_eq!(result.category, "Pontoon");
        assert_eq!(result.attributes, vec!["Flat deck"]);
    }

    #[test]
    fn test_normalize_stringified_shape() {
        // Some callers hand over the result as JSON text
        let raw = Value::String(r#"{"confidence": 0.92, "boatType": "Sailboat"}"#.to_string());
        let result = normalize_analysis(&raw).unwrap();
        assert_eq!(result.category, "Sailboat");
        assert_eq!(result.confidence, 0.92);
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn test_normalize_percentage_confidence() {
        let result = normalize_analysis(&json!({"type": "Motorboat", "confidence": 64})).unwrap();
        assert_eq!(result.confidence, 0.64);
    }

    #[test]
    fn test_normalize_rejects_missing_fields() {
        assert!(normalize_analysis(&json!({"confidence": 0.4})).is_err());
        assert!(normalize_analysis(&json!({"boatType": "Yacht"})).is_err());
        assert!(normalize_analysis(&json!({"boatType": "  ", "confidence": 0.4})).is_err());
        assert!(normalize_analysis(&json!({"boatType": "Yacht", "confidence": 140})).is_err());
        assert!(normalize_analysis(&json!(null)).is_err());
    }

    #[test]
    fn test_normalize_skips_non_string_attributes() {
        let result = normalize_analysis(&json!({
            "label": "Jet Ski",
            "confidence": 0.3,
            "features": ["Seat", 3, null, " "]
        }))
        .unwrap();
        assert_eq!(result.attributes, vec!["Seat"]);
    }
}
