use std::path::Path;
use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageDetail, ImageUrlArgs,
        ResponseFormat,
    },
    Client,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use dermalens_core::AgentError;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub metrics: LlmMetrics,
}

fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}

fn extract_response(
    response: CreateChatCompletionResponse,
    elapsed_ms: u64,
) -> Result<LlmResponse, AgentError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::LlmError("No response content".into()))?;

    let (input_tokens, output_tokens) = response
        .usage
        .map(|u| (u.prompt_tokens as u32, u.completion_tokens as u32))
        .unwrap_or((0, 0));

    info!(
        "LLM: {}ms, tokens: {}/{} (in/out)",
        elapsed_ms, input_tokens, output_tokens
    );

    Ok(LlmResponse {
        content,
        metrics: LlmMetrics {
            input_tokens,
            output_tokens,
            elapsed_ms,
        },
    })
}

/// Reads an image from disk into a base64 data URL for vision input.
pub fn image_data_url(path: &Path) -> Result<String, AgentError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AgentError::ImageRead(format!("{}: {e}", path.display())))?;

    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        Some(ext) if ext.eq_ignore_ascii_case("webp") => "image/webp",
        Some(ext) if ext.eq_ignore_ascii_case("gif") => "image/gif",
        _ => "image/jpeg",
    };

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[derive(Debug)]
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    default_model: String,
}

impl LlmClient {
    pub fn new(model: &str) -> Self {
        Self {
            client: Client::new(),
            default_model: model.to_string(),
        }
    }

    pub async fn chat(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.default_model)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system_prompt)
                        .build()
                        .map_err(llm_err)?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(user_input)
                        .build()
                        .map_err(llm_err)?,
                ),
            ])
            .build()
            .map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        extract_response(response, start.elapsed().as_millis() as u64)
    }

    /// Chat with an image attached as a vision content part.
    pub async fn chat_with_image(
        &self,
        system_prompt: &str,
        user_input: &str,
        image_data_url: &str,
    ) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(user_input)
            .build()
            .map_err(llm_err)?;

        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(image_data_url)
                    .detail(ImageDetail::High)
                    .build()
                    .map_err(llm_err)?,
            )
            .build()
            .map_err(llm_err)?;

        let parts: Vec<ChatCompletionRequestUserMessageContentPart> =
            vec![text_part.into(), image_part.into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.default_model)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system_prompt)
                        .build()
                        .map_err(llm_err)?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(parts)
                        .build()
                        .map_err(llm_err)?,
                ),
            ])
            .build()
            .map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        extract_response(response, start.elapsed().as_millis() as u64)
    }

    /// Requests a JSON-object response and returns the raw content string.
    pub async fn structured_raw(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.default_model)
            .response_format(ResponseFormat::JsonObject)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system_prompt)
                        .build()
                        .map_err(llm_err)?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(user_input)
                        .build()
                        .map_err(llm_err)?,
                ),
            ])
            .build()
            .map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        extract_response(response, start.elapsed().as_millis() as u64)
    }

    /// Requests a JSON-object response parsed into the caller's type.
    pub async fn structured<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<(T, LlmMetrics), AgentError> {
        let llm_response = self.structured_raw(system_prompt, user_input).await?;

        debug!("Structured response: {}", llm_response.content);

        let parsed = serde_json::from_str(&llm_response.content).map_err(|e| {
            AgentError::ParseError(format!(
                "Failed to parse: {} - content: {}",
                e, llm_response.content
            ))
        })?;

        Ok((parsed, llm_response.metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_carries_mime_from_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("dermalens_llm_test.png");
        std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();

        let url = image_data_url(&path).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn data_url_defaults_to_jpeg() {
        let dir = std::env::temp_dir();
        let path = dir.join("dermalens_llm_test.unknown");
        std::fs::write(&path, b"bytes").unwrap();

        let url = image_data_url(&path).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_image_is_an_image_read_error() {
        let err = image_data_url(Path::new("/nonexistent/face.jpg")).unwrap_err();
        assert!(matches!(err, AgentError::ImageRead(_)));
    }
}
