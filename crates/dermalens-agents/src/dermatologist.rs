use std::path::Path;

use dermalens_core::AgentError;
use dermalens_llm::{image_data_url, LlmClient};
use tracing::info;

use crate::prompts::{DERMATOLOGIST_PROMPT, OBSERVATION_REQUEST};

/// The image interpreter: examines the uploaded photo and produces clinical
/// observations for the rest of the team.
pub struct Dermatologist {
    client: LlmClient,
}

impl Dermatologist {
    pub fn new(model: &str) -> Self {
        Self {
            client: LlmClient::new(model),
        }
    }

    pub async fn observe(&self, image_path: &Path) -> Result<String, AgentError> {
        info!("DERMATOLOGIST: examining image");

        let data_url = image_data_url(image_path)?;
        let response = self
            .client
            .chat_with_image(DERMATOLOGIST_PROMPT, OBSERVATION_REQUEST, &data_url)
            .await?;

        Ok(response.content)
    }
}
