//! Minimal Gemini client for our one use-case.
//!
//! We only call `generateContent` with a single user part and read back the
//! first candidate's text. Calls are instrumented with model name, latency,
//! and payload sizes (never contents).
//!
//! NOTE: the API key travels as a query parameter, so the request URL must
//! never be logged. Log fields carry the model id and lengths only.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::ModelError;
use crate::util::excerpt_for_log;

/// Stand-in credential when GEMINI_API_KEY is unset. Guarantees the first
/// call surfaces a protocol failure instead of the process refusing to start.
const PLACEHOLDER_API_KEY: &str = "missing-api-key";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Construct the client from GEMINI_API_KEY / GEMINI_BASE_URL /
  /// GEMINI_MODEL, falling back to defaults for everything but the key.
  pub fn from_env() -> Result<Self, reqwest::Error> {
    let api_key =
      std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| PLACEHOLDER_API_KEY.into());
    let base_url =
      std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()?;

    Ok(Self { client, api_key, base_url, model })
  }

  /// True when no real credential was configured.
  pub fn key_is_placeholder(&self) -> bool {
    self.api_key == PLACEHOLDER_API_KEY
  }

  /// Single-shot completion: send `prompt`, return the first candidate's
  /// text. One outbound request per call; no retries, no caching.
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  pub async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
    let url = format!(
      "{}/models/{}:generateContent?key={}",
      self.base_url, self.model, self.api_key
    );
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
    };

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "zhongkuai-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or_else(|| excerpt_for_log(&body, 300));
      error!(target: "zhongkuai_backend", %status, message = %msg, "Gemini returned an error status");
      return Err(ModelError::Protocol { status, body });
    }

    let body = res.text().await?;
    let envelope: GenerateContentResponse = match serde_json::from_str(&body) {
      Ok(env) => env,
      Err(_) => return Err(ModelError::Shape { body }),
    };

    if let Some(usage) = &envelope.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, candidate_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }

    match envelope.first_candidate_text() {
      Some(text) => {
        info!(elapsed = ?start.elapsed(), completion_len = text.len(), "Gemini completion received");
        Ok(text)
      }
      None => Err(ModelError::Shape { body }),
    }
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<Content>,
}
#[derive(Serialize)]
struct Content {
  parts: Vec<Part>,
}
#[derive(Serialize)]
struct Part {
  text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}
#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count: Option<u32>,
  #[serde(default)]
  candidates_token_count: Option<u32>,
  #[serde(default)]
  total_token_count: Option<u32>,
}

impl GenerateContentResponse {
  /// Text at `candidates[0].content.parts[0].text`; None means the envelope
  /// does not have the shape we rely on. Empty text counts as missing.
  fn first_candidate_text(self) -> Option<String> {
    self.candidates.into_iter().next()?
      .content?
      .parts.into_iter().next()?
      .text
      .filter(|t| !t.is_empty())
  }
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn request_body_matches_the_wire_contract() {
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: "出两道题".into() }] }],
    };
    assert_eq!(
      serde_json::to_value(&req).unwrap(),
      json!({"contents": [{"parts": [{"text": "出两道题"}]}]})
    );
  }

  #[test]
  fn candidate_text_is_read_from_the_expected_path() {
    let body = json!({
      "candidates": [
        {"content": {"parts": [{"text": "[{\"question\":\"…\"}]"}], "role": "model"}}
      ],
      "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 34, "totalTokenCount": 46}
    });
    let envelope: GenerateContentResponse = serde_json::from_value(body).unwrap();
    assert_eq!(envelope.first_candidate_text().as_deref(), Some("[{\"question\":\"…\"}]"));
  }

  #[test]
  fn missing_or_empty_parts_are_a_shape_miss() {
    let envelope: GenerateContentResponse =
      serde_json::from_value(json!({"candidates": [{"content": {"parts": []}}]})).unwrap();
    assert_eq!(envelope.first_candidate_text(), None);

    let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
    assert_eq!(empty.first_candidate_text(), None);

    let blank_text: GenerateContentResponse =
      serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]}))
        .unwrap();
    assert_eq!(blank_text.first_candidate_text(), None);
  }

  #[test]
  fn gemini_error_bodies_yield_their_message() {
    let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("Resource has been exhausted"));
    assert_eq!(extract_gemini_error("not json"), None);
  }

  // A refused local connect exercises the transport path without any live
  // endpoint. The keyed URL must not survive into the error text.
  #[tokio::test]
  async fn transport_failures_never_reveal_the_api_key() {
    let gemini = Gemini {
      client: reqwest::Client::new(),
      api_key: "credential-must-not-appear".into(),
      base_url: "http://127.0.0.1:9".into(),
      model: DEFAULT_MODEL.into(),
    };
    let err = gemini.complete("出一道题").await.unwrap_err();
    let text = err.to_string();
    assert!(matches!(err, ModelError::Transport(_)), "unexpected error: {text}");
    assert!(!text.contains("credential-must-not-appear"), "leaked key: {text}");
    assert!(!text.contains("key="), "leaked query string: {text}");
  }
}
