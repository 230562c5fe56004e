//! [`IssueEnhancer`] backed by an OpenAI-compatible text-generation service.
//!
//! Without credentials [`LlmEnhancer::from_env`] returns `None` and the lint
//! engine runs exactly as if no enhancer had been configured.

pub mod client;
pub mod prompts;
pub mod response_parser;

pub use client::{ChatClient, ClientSettings};

use crate::rules::{EnhancedFix, Issue, IssueEnhancer, SourceContext, Verification};
use anyhow::Result;

const VERIFY_MAX_TOKENS: u32 = 400;
const FIX_MAX_TOKENS: u32 = 800;

pub struct LlmEnhancer {
    client: ChatClient,
}

impl LlmEnhancer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// Builds an enhancer from environment credentials; `model` overrides the
    /// environment's model choice.
    pub fn from_env(model: Option<&str>) -> Result<Option<Self>> {
        let Some(mut settings) = ClientSettings::from_env() else {
            log::info!("No enhancement credentials configured; skipping enhancement");
            return Ok(None);
        };
        if let Some(model) = model {
            settings.model = model.to_string();
        }
        Ok(Some(Self::new(ChatClient::new(settings)?)))
    }
}

impl IssueEnhancer for LlmEnhancer {
    fn verify(&self, issue: &Issue, context: &SourceContext) -> Result<Verification> {
        let reply = self.client.complete(
            prompts::VERIFY_SYSTEM_PROMPT,
            &prompts::verify_prompt(issue, context),
            VERIFY_MAX_TOKENS,
        )?;
        let mut verification: Verification = response_parser::parse_json(&reply)?;
        verification.confidence = verification.confidence.clamp(0.0, 1.0);
        Ok(verification)
    }

    fn enhance_fix(
        &self,
        issue: &Issue,
        context: &SourceContext,
        observed_patterns: &[String],
    ) -> Result<EnhancedFix> {
        let reply = self.client.complete(
            prompts::FIX_SYSTEM_PROMPT,
            &prompts::fix_prompt(issue, context, observed_patterns),
            FIX_MAX_TOKENS,
        )?;
        response_parser::parse_json(&reply)
    }
}
