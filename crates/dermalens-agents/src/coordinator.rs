use dermalens_core::{AgentError, ConsultPlan};
use dermalens_llm::LlmClient;
use tracing::info;

use crate::prompts::{COORDINATOR_PROMPT, REPORT_PROMPT};

/// The routing coordinator: decides which specialists to consult and
/// composes the final structured report.
pub struct Coordinator {
    client: LlmClient,
}

impl Coordinator {
    pub fn new(model: &str) -> Self {
        Self {
            client: LlmClient::new(model),
        }
    }

    pub async fn plan(&self, observations: &str) -> Result<ConsultPlan, AgentError> {
        info!("COORDINATOR: planning consultations");

        let context = format!(
            "Clinical observations:\n{observations}\n\nDecide which specialists to consult before the final report is written."
        );

        let (plan, _metrics) = self
            .client
            .structured::<ConsultPlan>(COORDINATOR_PROMPT, &context)
            .await?;

        info!("COORDINATOR: consulting {} specialist(s)", plan.consult.len());

        Ok(plan)
    }

    /// Composes the final report and returns it as a raw JSON string.
    pub async fn compose(
        &self,
        observations: &str,
        findings: &[(&str, String)],
    ) -> Result<String, AgentError> {
        info!("COORDINATOR: composing report");

        let findings_section = if findings.is_empty() {
            "None.".to_string()
        } else {
            findings
                .iter()
                .map(|(source, notes)| format!("[{source}]\n{notes}"))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let context = format!(
            "Clinical observations:\n{observations}\n\nSpecialist findings:\n{findings_section}\n\nProduce the final structured report."
        );

        let response = self.client.structured_raw(REPORT_PROMPT, &context).await?;
        Ok(response.content)
    }
}
