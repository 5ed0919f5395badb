use dermalens_core::AgentError;
use dermalens_llm::LlmClient;
use tracing::info;

use crate::prompts::RESEARCH_SPECIALIST_PROMPT;

const ARXIV_ENDPOINT: &str = "http://export.arxiv.org/api/query";
const MAX_ENTRIES: usize = 5;

#[derive(Debug)]
struct ArxivEntry {
    title: String,
    link: String,
    summary: String,
}

/// Extracts the text between `<tag>` and `</tag>` in a fragment.
fn extract_tag(fragment: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = fragment.find(&open)? + open.len();
    let end = fragment[start..].find(&close)? + start;
    Some(collapse_whitespace(&fragment[start..end]))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pulls entries out of an arXiv Atom feed using plain string matching.
fn extract_entries(feed: &str, max: usize) -> Vec<ArxivEntry> {
    feed.split("<entry>")
        .skip(1)
        .take(max)
        .filter_map(|fragment| {
            Some(ArxivEntry {
                title: extract_tag(fragment, "title")?,
                link: extract_tag(fragment, "id")?,
                summary: extract_tag(fragment, "summary")?,
            })
        })
        .collect()
}

/// The academic-research specialist: queries the arXiv export API and
/// synthesizes the abstracts into consultation notes.
pub struct ResearchSpecialist {
    client: LlmClient,
    http: reqwest::Client,
}

impl ResearchSpecialist {
    pub fn new(model: &str) -> Self {
        Self {
            client: LlmClient::new(model),
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_entries(&self, query: &str) -> Result<Vec<ArxivEntry>, AgentError> {
        let url = format!(
            "{ARXIV_ENDPOINT}?search_query=all:{}&start=0&max_results={MAX_ENTRIES}",
            urlencoding::encode(query)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::ExternalApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::ExternalApi(format!(
                "arXiv API error: {}",
                response.status()
            )));
        }

        let feed = response
            .text()
            .await
            .map_err(|e| AgentError::ExternalApi(e.to_string()))?;

        Ok(extract_entries(&feed, MAX_ENTRIES))
    }

    fn format_entries(entries: &[ArxivEntry]) -> String {
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}\n   {}\n   {}", i + 1, e.title, e.link, e.summary))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub async fn consult(&self, query: &str) -> Result<String, AgentError> {
        info!("RESEARCH: consulting the literature");

        let entries = self.fetch_entries(query).await?;
        if entries.is_empty() {
            return Ok(format!("No published results found for: {query}"));
        }

        let context = format!(
            "Question: {query}\n\nPapers:\n{}\n\nSynthesize these papers into consultation notes for the team.",
            Self::format_entries(&entries)
        );

        let response = self.client.chat(RESEARCH_SPECIALIST_PROMPT, &context).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001</id>
    <title>Deep Learning for
        Acne Severity Grading</title>
    <summary>
      We present a model that grades acne severity from facial photographs.
    </summary>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002</id>
    <title>Skin Hydration Estimation</title>
    <summary>Hydration scores from RGB images.</summary>
  </entry>
</feed>"#;

    #[test]
    fn extracts_entries_from_atom_feed() {
        let entries = extract_entries(FEED, 5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Deep Learning for Acne Severity Grading");
        assert_eq!(entries[0].link, "http://arxiv.org/abs/2401.00001");
        assert!(entries[1].summary.contains("Hydration scores"));
    }

    #[test]
    fn respects_entry_limit() {
        let entries = extract_entries(FEED, 1);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn feed_without_entries_yields_nothing() {
        assert!(extract_entries("<feed><title>empty</title></feed>", 5).is_empty());
    }
}
