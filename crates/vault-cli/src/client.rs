//! HTTP client for a `generateContent`-style text generation API.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vault_core::chat::{TextGenerator, UpstreamError};

use crate::settings::GeneratorConfig;

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GenerativeClient {
  client: Client,
  config: GeneratorConfig,
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
  role:  &'a str,
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
  text: Option<String>,
}

impl GenerativeClient {
  pub fn new(config: GeneratorConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }

  async fn post(&self, prompt: &str) -> Result<String, UpstreamError> {
    let body = GenerateRequest {
      contents: [Content {
        role:  "user",
        parts: [Part { text: prompt }],
      }],
    };

    let resp = self
      .client
      .post(self.url())
      .query(&[("key", self.config.api_key.as_str())])
      .json(&body)
      .send()
      .await
      .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    let status = resp.status();
    let text = resp
      .text()
      .await
      .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    if !status.is_success() {
      return Err(UpstreamError::Status {
        code: status.as_u16(),
        body: text,
      });
    }
    extract_text(&text)
  }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
fn extract_text(body: &str) -> Result<String, UpstreamError> {
  let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| {
    UpstreamError::UnexpectedShape(format!("{e}: {}", snippet(body)))
  })?;

  parsed
    .candidates
    .into_iter()
    .next()
    .and_then(|c| c.content)
    .and_then(|c| c.parts.into_iter().next())
    .and_then(|p| p.text)
    .ok_or_else(|| {
      let shown = serde_json::from_str::<Value>(body)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| body.to_owned());
      UpstreamError::UnexpectedShape(snippet(&shown))
    })
}

fn snippet(s: &str) -> String { s.chars().take(200).collect() }

impl TextGenerator for GenerativeClient {
  async fn generate(&self, prompt: String) -> Result<String, UpstreamError> {
    tracing::debug!(model = %self.config.model, len = prompt.len(), "generateContent");
    self.post(&prompt).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_body_shape() {
    let body = GenerateRequest {
      contents: [Content {
        role:  "user",
        parts: [Part { text: "hi" }],
      }],
    };
    assert_eq!(
      serde_json::to_value(&body).unwrap(),
      serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
    );
  }

  #[test]
  fn extracts_first_candidate_text() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"Try dal."},{"text":"x"}]}},
                  {"content":{"parts":[{"text":"other"}]}}]}"#;
    assert_eq!(extract_text(body).unwrap(), "Try dal.");
  }

  #[test]
  fn missing_candidates_is_unexpected_shape() {
    for body in [
      r#"{}"#,
      r#"{"candidates":[]}"#,
      r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
      r#"{"candidates":[{"content":{"parts":[]}}]}"#,
      "not json",
    ] {
      assert!(
        matches!(extract_text(body), Err(UpstreamError::UnexpectedShape(_))),
        "{body}"
      );
    }
  }

  #[test]
  fn url_joins_model() {
    let client = GenerativeClient::new(GeneratorConfig {
      base_url: "http://localhost:9/v1beta/".into(),
      model:    "m".into(),
      api_key:  String::new(),
    })
    .unwrap();
    assert_eq!(client.url(), "http://localhost:9/v1beta/models/m:generateContent");
  }
}
