use dermalens_core::AgentError;
use dermalens_llm::LlmClient;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prompts::SEARCH_SPECIALIST_PROMPT;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const MAX_RESULTS: u32 = 5;

#[derive(Debug, Serialize)]
struct TavilyRequest {
    api_key: String,
    query: String,
    max_results: u32,
    search_depth: String,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
}

/// The web-search specialist: queries Tavily and synthesizes the results
/// into consultation notes.
#[derive(Debug)]
pub struct SearchSpecialist {
    client: LlmClient,
    http: reqwest::Client,
    api_key: String,
}

impl SearchSpecialist {
    pub fn new(model: &str, api_key: String) -> Result<Self, AgentError> {
        if api_key.is_empty() {
            return Err(AgentError::ExternalApi("TAVILY_API_KEY not configured".into()));
        }
        Ok(Self {
            client: LlmClient::new(model),
            http: reqwest::Client::new(),
            api_key,
        })
    }

    async fn search(&self, query: &str) -> Result<TavilyResponse, AgentError> {
        let request = TavilyRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            max_results: MAX_RESULTS,
            search_depth: "basic".to_string(),
        };

        let response = self
            .http
            .post(TAVILY_ENDPOINT)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ExternalApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalApi(format!(
                "Tavily API error: {status} - {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::ExternalApi(e.to_string()))
    }

    fn format_results(response: &TavilyResponse) -> String {
        let mut output = String::new();

        if let Some(answer) = &response.answer {
            output.push_str(&format!("Summary: {answer}\n\n"));
        }

        for (i, result) in response.results.iter().enumerate() {
            output.push_str(&format!(
                "{}. {}\n   {}\n   {}\n\n",
                i + 1,
                result.title,
                result.url,
                result.content
            ));
        }

        output
    }

    pub async fn consult(&self, query: &str) -> Result<String, AgentError> {
        info!("SEARCH: consulting web sources");

        let results = self.search(query).await?;

        let context = format!(
            "Question: {query}\n\nSearch Results:\n{}\nSynthesize these results into consultation notes for the team.",
            Self::format_results(&results)
        );

        let response = self.client.chat(SEARCH_SPECIALIST_PROMPT, &context).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = SearchSpecialist::new("gpt-4o", String::new()).unwrap_err();
        assert!(matches!(err, AgentError::ExternalApi(_)));
    }

    #[test]
    fn results_format_numbered_with_summary() {
        let response = TavilyResponse {
            answer: Some("Retinoids help with acne scarring.".into()),
            results: vec![TavilyResult {
                title: "Acne scar treatments".into(),
                url: "https://example.org/scars".into(),
                content: "Overview of options.".into(),
            }],
        };

        let formatted = SearchSpecialist::format_results(&response);
        assert!(formatted.starts_with("Summary: Retinoids"));
        assert!(formatted.contains("1. Acne scar treatments"));
        assert!(formatted.contains("https://example.org/scars"));
    }
}
