//! Parsing and validation of the team's raw JSON report.
//!
//! The analyzer returns the report as a JSON string. Providers occasionally
//! double-encode the payload (a JSON string containing JSON), so parsing
//! tolerates one level of that before validating the schema.

use serde_json::Value;

use crate::{AgentError, SkinAnalysis};

/// Top-level fields that must be present for a report to be persisted.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "overall_health",
    "skin_type",
    "concerns",
    "recommendations",
    "analysis_metrics",
];

/// Parses and validates a raw report into a [`SkinAnalysis`].
pub fn parse_report(raw: &str) -> Result<SkinAnalysis, AgentError> {
    let mut value: Value = serde_json::from_str(raw)?;

    if let Value::String(inner) = &value {
        value = serde_json::from_str(inner)?;
    }

    let obj = value
        .as_object()
        .ok_or_else(|| AgentError::ParseError("report is not a JSON object".into()))?;

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(AgentError::MissingField(field));
        }
    }

    let analysis: SkinAnalysis = serde_json::from_value(value)?;
    validate(&analysis)?;
    Ok(analysis)
}

fn validate(analysis: &SkinAnalysis) -> Result<(), AgentError> {
    for concern in &analysis.concerns {
        if !(0.0..=1.0).contains(&concern.confidence) {
            return Err(AgentError::ParseError(format!(
                "confidence {} for concern '{}' outside 0.0-1.0",
                concern.confidence, concern.name
            )));
        }
    }

    let metrics = &analysis.analysis_metrics;
    for (label, score) in [
        ("skin_hydration", metrics.skin_hydration),
        ("texture_uniformity", metrics.texture_uniformity),
        ("pore_visibility", metrics.pore_visibility),
        ("overall_score", metrics.overall_score),
    ] {
        if score > 100 {
            return Err(AgentError::ParseError(format!(
                "{label} score {score} outside 0-100"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> serde_json::Value {
        serde_json::json!({
            "overall_health": "Good",
            "skin_type": "Combination",
            "concerns": [
                {"name": "Acne Scars", "severity": "Moderate", "type": "Box Scars", "confidence": 0.89},
                {"name": "Dryness", "severity": "Mild", "type": null, "confidence": 0.75}
            ],
            "recommendations": [
                {"title": "Use a Gentle Cleanser", "description": "Use a pH-balanced cleanser twice daily.", "priority": "High"}
            ],
            "analysis_metrics": {
                "skin_hydration": 65,
                "texture_uniformity": 78,
                "pore_visibility": 45,
                "overall_score": 72
            }
        })
    }

    #[test]
    fn parses_direct_json() {
        let raw = sample_report().to_string();
        let analysis = parse_report(&raw).unwrap();
        assert_eq!(analysis.skin_type, "Combination");
        assert_eq!(analysis.concerns.len(), 2);
        assert_eq!(analysis.concerns[1].concern_type, None);
        assert_eq!(analysis.analysis_metrics.overall_score, 72);
    }

    #[test]
    fn parses_string_encoded_json() {
        let raw = serde_json::to_string(&sample_report().to_string()).unwrap();
        let analysis = parse_report(&raw).unwrap();
        assert_eq!(analysis.overall_health, "Good");
        assert_eq!(analysis.concern_names(), vec!["Acne Scars", "Dryness"]);
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut report = sample_report();
        report.as_object_mut().unwrap().remove("analysis_metrics");
        let err = parse_report(&report.to_string()).unwrap_err();
        assert!(matches!(err, AgentError::MissingField("analysis_metrics")));
    }

    #[test]
    fn rejects_non_object_report() {
        let err = parse_report("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let mut report = sample_report();
        report["concerns"][0]["confidence"] = serde_json::json!(1.3);
        let err = parse_report(&report.to_string()).unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
    }

    #[test]
    fn rejects_out_of_range_metric() {
        let mut report = sample_report();
        report["analysis_metrics"]["overall_score"] = serde_json::json!(140);
        let err = parse_report(&report.to_string()).unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
    }
}
