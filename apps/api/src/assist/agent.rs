use async_trait::async_trait;
use tracing::{debug, info};

use crate::assist::prompts::{
    enhance_prompt, skills_prompt, strip_intro_lines, summary_prompt, Preamble,
};
use crate::assist::{AssistError, EnhanceKind, SummaryContext};
use crate::llm_client::prompts::{CV_WRITER_SYSTEM, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::cv::Language;

/// The external text service, as the core sees it.
///
/// Carried in `AppState` as `Arc<dyn AssistAgent>`; tests swap in fakes.
#[async_trait]
pub trait AssistAgent: Send + Sync {
    async fn generate_summary(
        &self,
        ctx: &SummaryContext,
        language: Language,
    ) -> Result<String, AssistError>;

    async fn enhance_text(
        &self,
        text: &str,
        kind: EnhanceKind,
        language: Language,
    ) -> Result<String, AssistError>;

    async fn suggest_skills(
        &self,
        role_hint: &str,
        language: Language,
    ) -> Result<Vec<String>, AssistError>;
}

/// `AssistAgent` backed by `LlmClient`. Without a client every call fails
/// with `Unavailable` before any network traffic.
pub struct LlmAssistAgent {
    llm: Option<LlmClient>,
}

impl LlmAssistAgent {
    pub fn new(llm: Option<LlmClient>) -> Self {
        if llm.is_none() {
            info!("No API key configured; AI assist disabled");
        }
        Self { llm }
    }

    fn client(&self) -> Result<&LlmClient, AssistError> {
        self.llm.as_ref().ok_or(AssistError::Unavailable)
    }
}

#[async_trait]
impl AssistAgent for LlmAssistAgent {
    async fn generate_summary(
        &self,
        ctx: &SummaryContext,
        language: Language,
    ) -> Result<String, AssistError> {
        let llm = self.client()?;
        let raw = llm
            .call_text(&summary_prompt(ctx, language), CV_WRITER_SYSTEM)
            .await?;
        let summary = strip_intro_lines(&raw, Preamble::Summary);
        if summary.is_empty() {
            return Err(AssistError::EmptyResult);
        }
        Ok(summary)
    }

    async fn enhance_text(
        &self,
        text: &str,
        kind: EnhanceKind,
        language: Language,
    ) -> Result<String, AssistError> {
        let llm = self.client()?;
        if text.trim().is_empty() {
            debug!("Nothing to enhance; skipping call");
            return Ok(String::new());
        }
        let raw = llm
            .call_text(&enhance_prompt(text, kind, language), CV_WRITER_SYSTEM)
            .await?;
        let enhanced = strip_intro_lines(&raw, Preamble::Description);
        if enhanced.is_empty() {
            return Err(AssistError::EmptyResult);
        }
        Ok(enhanced)
    }

    async fn suggest_skills(
        &self,
        role_hint: &str,
        language: Language,
    ) -> Result<Vec<String>, AssistError> {
        let llm = self.client()?;
        let skills: Vec<String> = llm
            .call_json(&skills_prompt(role_hint, language), JSON_ONLY_SYSTEM)
            .await?;
        Ok(skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}
