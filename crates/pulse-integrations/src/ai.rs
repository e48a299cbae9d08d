//! OpenAI-compatible AI client
//!
//! Prompt templates for the business modules (note summaries, reply
//! drafts, task suggestions, payslip parsing) around a plain
//! `chat/completions` call. Model output destined for JSON parsing is
//! fence-stripped first; models routinely wrap JSON in markdown fences.

use pulse_core::config::OpenAiConfig;
use pulse_models::hr::PayslipData;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI returned status {0}")]
    Status(u16),
    #[error("Empty completion")]
    EmptyCompletion,
    #[error("Unparseable completion: {0}")]
    BadCompletion(String),
    #[error("AI is not configured")]
    NotConfigured,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatTurn {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatTurn,
}

/// A task suggestion produced from free-form context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestion {
    pub title: String,
    pub priority: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub struct AiService {
    client: Client,
    config: OpenAiConfig,
}

impl AiService {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        if config.api_key.is_empty() {
            return Err(AiError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatTurn {
                    role: "system".into(),
                    content: system.into(),
                },
                ChatTurn {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.endpoint))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "AI request rejected");
            return Err(AiError::Status(response.status().as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AiError::EmptyCompletion);
        }

        debug!(chars = content.len(), "AI completion received");
        Ok(content)
    }

    /// One-paragraph summary of a note
    pub async fn summarize_note(&self, title: &str, body: &str) -> Result<String, AiError> {
        let system = "You summarize business notes in one short paragraph. \
                      Answer in the note's language. No preamble.";
        let user = format!("Title: {}\n\n{}", title, body);
        Ok(self.chat(system, &user).await?.trim().to_string())
    }

    /// Draft a reply to an email
    pub async fn draft_reply(&self, original: &str, instructions: &str) -> Result<String, AiError> {
        let system = "You draft professional email replies. \
                      Return only the reply body, no subject line.";
        let user = format!(
            "Original message:\n{}\n\nInstructions: {}",
            original, instructions
        );
        Ok(self.chat(system, &user).await?.trim().to_string())
    }

    /// Suggest follow-up tasks from free-form context
    pub async fn suggest_tasks(&self, context: &str) -> Result<Vec<TaskSuggestion>, AiError> {
        let system = "You extract actionable follow-up tasks. Respond with a JSON array of \
                      objects with keys \"title\", \"priority\" (low|normal|high|urgent) and \
                      optional \"reason\". JSON only.";
        let completion = self.chat(system, context).await?;
        parse_json(&completion)
    }

    /// Extract structured fields from a payslip (cedolino) text
    pub async fn parse_payslip(&self, text: &str) -> Result<PayslipData, AiError> {
        let system = "You extract fields from Italian payslips (cedolini). Respond with a JSON \
                      object with keys \"employeeName\", \"period\" (YYYY-MM), \"gross\" and \
                      \"net\" (integer euro cents) and optional \"company\". JSON only.";
        let completion = self.chat(system, text).await?;
        parse_json(&completion)
    }
}

/// Strip markdown code fences wrapping a completion
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // opening fence may carry a language tag
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim().strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_json<T: serde::de::DeserializeOwned>(completion: &str) -> Result<T, AiError> {
    let cleaned = strip_code_fences(completion);
    serde_json::from_str(cleaned).map_err(|e| AiError::BadCompletion(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_task_suggestions_with_fences() {
        let completion = "```json\n[{\"title\":\"Call ACME\",\"priority\":\"high\"}]\n```";
        let tasks: Vec<TaskSuggestion> = parse_json(completion).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call ACME");
        assert_eq!(tasks[0].reason, None);
    }

    #[test]
    fn test_parse_payslip_data() {
        let completion = "{\"employeeName\":\"Mario Rossi\",\"period\":\"2025-06\",\
                          \"gross\":250000,\"net\":182050}";
        let data: PayslipData = parse_json(completion).unwrap();
        assert_eq!(data.period, "2025-06");
        assert_eq!(data.net, 182050);
        assert_eq!(data.company, None);
    }

    #[test]
    fn test_garbage_completion_is_typed_error() {
        let err = parse_json::<PayslipData>("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, AiError::BadCompletion(_)));
    }

    #[test]
    fn test_empty_key_not_configured() {
        let config = OpenAiConfig {
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com/v1".into(),
            timeout_seconds: 60,
        };
        assert!(matches!(AiService::new(config), Err(AiError::NotConfigured)));
    }
}
