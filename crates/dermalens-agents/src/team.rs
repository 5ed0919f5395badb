use std::path::Path;

use async_trait::async_trait;
use dermalens_core::{AgentError, SkinAnalyzer, SpecialistKind};
use tracing::{info, warn};

use crate::{Coordinator, Dermatologist, ResearchSpecialist, SearchSpecialist};

/// The fixed analysis team: dermatologist, optional search specialist,
/// research specialist, all behind the routing coordinator.
pub struct DermatologyTeam {
    dermatologist: Dermatologist,
    coordinator: Coordinator,
    search: Option<SearchSpecialist>,
    research: ResearchSpecialist,
}

impl DermatologyTeam {
    pub fn new(model: &str, tavily_api_key: Option<String>) -> Self {
        let search = tavily_api_key.and_then(|key| match SearchSpecialist::new(model, key) {
            Ok(specialist) => Some(specialist),
            Err(e) => {
                warn!("Search specialist unavailable: {e}");
                None
            }
        });

        if search.is_none() {
            info!("Running without web search (TAVILY_API_KEY not set)");
        }

        Self {
            dermatologist: Dermatologist::new(model),
            coordinator: Coordinator::new(model),
            search,
            research: ResearchSpecialist::new(model),
        }
    }
}

#[async_trait]
impl SkinAnalyzer for DermatologyTeam {
    async fn analyze(&self, image_path: &Path) -> Result<String, AgentError> {
        let observations = self.dermatologist.observe(image_path).await?;

        let plan = self.coordinator.plan(&observations).await?;

        let mut findings: Vec<(&str, String)> = Vec::new();
        for request in &plan.consult {
            match request.specialist {
                SpecialistKind::Search => {
                    let Some(ref specialist) = self.search else {
                        info!("COORDINATOR: search requested but not configured, skipping");
                        continue;
                    };
                    findings.push(("web search", specialist.consult(&request.query).await?));
                }
                SpecialistKind::Research => {
                    findings.push(("literature", self.research.consult(&request.query).await?));
                }
            }
        }

        self.coordinator.compose(&observations, &findings).await
    }
}
