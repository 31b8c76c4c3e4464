//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Drill views deliberately omit answer, explanation, and suggestion; those
//! fields only travel in verdicts and mistake-book entries.

use serde::{Deserialize, Serialize};

use crate::domain::Question;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Ingest {
        material: String,
        count: Option<u32>,
    },
    DrillView,
    SubmitAnswer {
        choice: String,
    },
    Advance,
    Restart,
    MistakeBook,
    ForgetMistake {
        index: usize,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Ingested {
        loaded: usize,
    },
    Drill {
        drill: DrillOut,
    },
    Verdict {
        correct: bool,
        answer: String,
        explanation: String,
        suggestion: String,
        mistakes: usize,
    },
    MistakeBook {
        entries: Vec<MistakeOut>,
        total: usize,
    },
    Error {
        message: String,
    },
}

/// What the learner sees while answering: stem and options only.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub question: String,
    pub options: Vec<String>,
}

/// One snapshot of the drill: where the cursor is and what to show.
/// `question` is None when the batch is finished or nothing is loaded.
#[derive(Debug, Serialize)]
pub struct DrillOut {
    pub complete: bool,
    pub index: usize,
    pub total: usize,
    pub mistakes: usize,
    pub question: Option<QuestionOut>,
}

/// Convert the internal question to the answer-free public DTO.
pub fn to_question_out(q: &Question) -> QuestionOut {
    QuestionOut {
        question: q.question.clone(),
        options: q.options.clone(),
    }
}

/// Full card for the review list, keyed by its position in the book.
#[derive(Debug, Serialize)]
pub struct MistakeOut {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
    pub suggestion: String,
}

pub fn to_mistake_out(index: usize, q: &Question) -> MistakeOut {
    MistakeOut {
        index,
        question: q.question.clone(),
        options: q.options.clone(),
        answer: q.answer.clone(),
        explanation: q.explanation.clone(),
        suggestion: q.suggestion.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct IngestIn {
    pub material: String,
    pub count: Option<u32>,
}
#[derive(Serialize)]
pub struct IngestOut {
    pub loaded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmitIn {
    pub choice: String,
}
#[derive(Serialize)]
pub struct VerdictOut {
    pub correct: bool,
    pub answer: String,
    pub explanation: String,
    pub suggestion: String,
    pub mistakes: usize,
}

#[derive(Serialize)]
pub struct MistakesOut {
    pub entries: Vec<MistakeOut>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ForgetIn {
    pub index: usize,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_snake_case_type_tags() {
        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type": "submit_answer", "choice": "A"}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::SubmitAnswer { ref choice } if choice == "A"));

        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type": "ingest", "material": "存货", "count": 5}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::Ingest { count: Some(5), .. }));
    }

    #[test]
    fn drill_views_do_not_leak_the_answer() {
        let q = Question {
            question: "下列属于流动资产的是？".into(),
            options: vec!["A. 存货".into(), "B. 固定资产".into(), "C. 无形资产".into(), "D. 长期股权投资".into()],
            answer: "A".into(),
            explanation: "存货属于流动资产。".into(),
            suggestion: "复习资产分类。".into(),
        };
        let drill = ServerWsMessage::Drill {
            drill: DrillOut {
                complete: false,
                index: 0,
                total: 1,
                mistakes: 0,
                question: Some(to_question_out(&q)),
            },
        };
        let json = serde_json::to_string(&drill).unwrap();
        assert!(json.contains("下列属于流动资产的是"));
        assert!(!json.contains("answer"));
        assert!(!json.contains("explanation"));
        assert!(!json.contains("suggestion"));
    }
}
