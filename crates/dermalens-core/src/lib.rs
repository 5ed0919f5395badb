//! Core domain types, error definitions, and the analyzer trait.
//!
//! This crate defines the fundamental types shared across the DermaLens
//! system: errors, the skin-analysis report schema, the coordinator's
//! consultation plan, and the analyzer abstraction the server depends on.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod report;

/// Errors that can occur during agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    LlmError(String),

    #[error("Failed to parse structured output: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Failed to read image: {0}")]
    ImageRead(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// A single skin concern identified in the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinConcern {
    pub name: String,
    pub severity: String,
    #[serde(rename = "type")]
    pub concern_type: Option<String>,
    pub confidence: f64,
}

/// A treatment recommendation produced by the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: String,
}

/// Quantitative scores, each bounded to 0-100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub skin_hydration: u8,
    pub texture_uniformity: u8,
    pub pore_visibility: u8,
    pub overall_score: u8,
}

/// The complete structured analysis of one facial image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinAnalysis {
    pub overall_health: String,
    pub skin_type: String,
    pub concerns: Vec<SkinConcern>,
    pub recommendations: Vec<Recommendation>,
    pub analysis_metrics: AnalysisMetrics,
}

impl SkinAnalysis {
    /// Returns the concern names in report order.
    pub fn concern_names(&self) -> Vec<String> {
        self.concerns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Specialists the coordinator can consult before composing the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpecialistKind {
    Search,
    Research,
}

/// A single consultation the coordinator has decided on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultRequest {
    pub specialist: SpecialistKind,
    pub query: String,
}

/// Decision made by the coordinator about which specialists to consult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultPlan {
    #[serde(default)]
    pub consult: Vec<ConsultRequest>,
}

/// Trait for anything that can analyze a skin image.
///
/// The return value is the raw JSON report as produced by the team; the
/// caller is responsible for parsing and validating it (see [`report`]).
#[async_trait]
pub trait SkinAnalyzer: Send + Sync {
    async fn analyze(&self, image_path: &Path) -> Result<String, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consult_plan_roundtrip() {
        let json = r#"{"consult":[{"specialist":"SEARCH","query":"acne scar treatment"},{"specialist":"RESEARCH","query":"rosacea clinical trials"}]}"#;
        let plan: ConsultPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.consult.len(), 2);
        assert_eq!(plan.consult[0].specialist, SpecialistKind::Search);
        assert_eq!(plan.consult[1].specialist, SpecialistKind::Research);
    }

    #[test]
    fn consult_plan_defaults_to_empty() {
        let plan: ConsultPlan = serde_json::from_str("{}").unwrap();
        assert!(plan.consult.is_empty());
    }

    #[test]
    fn concern_type_serializes_as_type() {
        let concern = SkinConcern {
            name: "Dryness".into(),
            severity: "Mild".into(),
            concern_type: None,
            confidence: 0.75,
        };
        let value = serde_json::to_value(&concern).unwrap();
        assert!(value.get("type").is_some());
        assert!(value.get("concern_type").is_none());
    }
}
