use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use p2j_core::{
    NewTask, Personality, SummaryRequest, parse_schedule_reply, schedule_prompt,
    summary_or_fallback, summary_prompt,
};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth;
use crate::config::LlmSection;

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    section: LlmSection,
    api_key: String,
}

impl LlmClient {
    pub fn new(section: LlmSection, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            section,
            api_key,
        }
    }

    pub fn from_config(section: &LlmSection) -> Result<Self> {
        Ok(Self::new(section.clone(), auth::resolve_api_key()?))
    }

    /// Send one user message and return the first choice's text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            temperature: Option<f32>,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.section.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: self.section.temperature,
        };

        debug!(endpoint = %self.section.endpoint, model = %self.section.model, "llm request");
        let resp = self
            .http
            .post(&self.section.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("X-Title", &self.section.app_title)
            .json(&body)
            .send()
            .await
            .context("llm request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("llm error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse llm response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(content.trim().to_string())
    }

    pub async fn generate_schedule(
        &self,
        user_input: &str,
        personality: Personality,
        today: NaiveDate,
    ) -> Result<Vec<NewTask>> {
        let reply = self
            .complete(&schedule_prompt(user_input, personality, today))
            .await?;
        let tasks = parse_schedule_reply(&reply).context("model reply had no usable schedule")?;
        info!(count = tasks.len(), "schedule generated");
        Ok(tasks)
    }

    /// Never fails: any upstream problem becomes the fallback sentence.
    pub async fn generate_summary(&self, req: &SummaryRequest) -> String {
        summary_or_fallback(self.complete(&summary_prompt(req)).await)
    }
}
