use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde_json::Value;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. \
A user will provide you with a transcript, your job is to read it and generate a summary. \
This summary should be a bullet pointed list with the main ideas. Ensure that there is no repetition. \
For each main idea provide the specific details as sub-bullet points. \
If there are any facts or statistics, include those in the sub bullet points.";

/// Turns a full transcript into a condensed summary.
///
/// `Ok(None)` means the model answered without any usable content.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript_text: &str) -> Result<Option<String>>;
}

/// Chat-completion summarizer backed by OpenAI or Anthropic, picked by model name
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    model: String,
}

impl LlmSummarizer {
    pub fn new(client: reqwest::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, transcript_text: &str) -> Result<Option<String>> {
        if is_anthropic_model(&self.model) {
            let json = request_anthropic(&self.client, transcript_text, &self.model).await?;
            Ok(extract_anthropic_text(&json))
        } else {
            let json = request_openai(&self.client, transcript_text, &self.model).await?;
            Ok(extract_openai_text(&json))
        }
    }
}

fn is_anthropic_model(model: &str) -> bool {
    model.starts_with("claude")
}

async fn request_anthropic(client: &reqwest::Client, transcript_text: &str, model: &str) -> Result<Value> {
    let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        eyre::eyre!("ANTHROPIC_API_KEY environment variable not set (required for Claude summarization)")
    })?;

    debug!("Summarizing {} chars via Anthropic API with model {model}", transcript_text.len());

    let body = serde_json::json!({
        "model": model,
        "max_tokens": 4096,
        "system": SYSTEM_PROMPT,
        "messages": [
            { "role": "user", "content": transcript_text }
        ]
    });

    let resp = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", &api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("Anthropic API returned {status}: {body}");
    }

    Ok(resp.json().await?)
}

async fn request_openai(client: &reqwest::Client, transcript_text: &str, model: &str) -> Result<Value> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| eyre::eyre!("OPENAI_API_KEY environment variable not set (required for OpenAI summarization)"))?;

    debug!("Summarizing {} chars via OpenAI API with model {model}", transcript_text.len());

    let body = serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": transcript_text }
        ]
    });

    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(&api_key)
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("OpenAI API returned {status}: {body}");
    }

    Ok(resp.json().await?)
}

fn extract_anthropic_text(json: &Value) -> Option<String> {
    let text = json
        .get("content")?
        .as_array()?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<String>();
    (!text.is_empty()).then_some(text)
}

fn extract_openai_text(json: &Value) -> Option<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
