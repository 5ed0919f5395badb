//! LLM access for the DermaLens agent team.
//!
//! Wraps async-openai with the three call shapes the team needs: plain chat,
//! structured JSON output, and vision input from a local image file.

mod client;

pub use client::{image_data_url, LlmClient, LlmMetrics, LlmResponse};
