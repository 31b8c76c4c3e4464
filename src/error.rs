//! Failure taxonomies for the model client and the question synthesizer.
//!
//! Every variant is user-renderable: the shell shows `Display` text inline as
//! an error banner, so diagnostics (status code, response body, raw model
//! reply) ride inside the error values themselves.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single `generateContent` call.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Network-level failure: unreachable host, timeout, DNS, body read.
    #[error("Gemini request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// Non-success HTTP status, with the response body for diagnosis.
    #[error("Gemini HTTP {status}: {body}")]
    Protocol { status: StatusCode, body: String },
    /// Success status but no text at `candidates[0].content.parts[0].text`.
    #[error("Gemini reply had no candidate text. Envelope: {body}")]
    Shape { body: String },
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest's Display embeds the request URL, and ours carries the API
        // key as a query parameter. Strip the URL here so no banner or log
        // line built from this error can reproduce it.
        Self::Transport(e.without_url())
    }
}

/// Failures of turning `(material, count)` into a question batch.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error(transparent)]
    Model(#[from] ModelError),
    /// The cleaned reply was not a JSON array. Keeps the raw reply so the
    /// shell can dump the envelope for debugging.
    #[error("JSON parse error: {source}. Raw reply: {raw}")]
    Parse {
        source: serde_json::Error,
        raw: String,
    },
    /// The reply parsed as an array but no element survived validation (or
    /// the array was empty). Keeps the reply for the same inline dump.
    #[error("未能生成有效题目，请调整材料后重试。模型回复：{raw}")]
    NoValidItems { raw: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_failure_display_names_the_status() {
        let err = ModelError::Protocol {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "quota exceeded".into(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("quota exceeded"));
    }

    #[test]
    fn parse_failure_display_carries_the_raw_reply() {
        let source = serde_json::from_str::<Vec<i32>>("not json").unwrap_err();
        let err = SynthError::Parse { source, raw: "好的，下面是题目".into() };
        assert!(err.to_string().contains("好的，下面是题目"));
    }

    #[test]
    fn unusable_batch_display_guides_a_retry_and_dumps_the_reply() {
        let err = SynthError::NoValidItems { raw: r#"[{"question":""}]"#.into() };
        let text = err.to_string();
        assert!(text.contains("重试"));
        assert!(text.contains(r#"[{"question":""}]"#));
    }
}
