//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Ingesting study material (synthesize a batch, replace the session)
//!   - Drill views, grading, advancing, restarting
//!   - The mistake book (list and forget)
//!
//! Failures never tear the session down: errors come back as banner text in
//! the reply and the loaded batch stays as it was.

use tracing::{debug, error, info, instrument, warn};

use crate::error::SynthError;
use crate::protocol::{to_mistake_out, to_question_out, DrillOut, IngestOut, MistakesOut, VerdictOut};
use crate::quiz::QuizSession;
use crate::state::AppState;
use crate::synth::synthesize_questions;

pub const DEFAULT_QUESTION_COUNT: u32 = 3;
pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 10;

/// Requested batch size, defaulted and clamped to the supported range.
pub fn clamp_count(count: Option<u32>) -> u32 {
  count
    .unwrap_or(DEFAULT_QUESTION_COUNT)
    .clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT)
}

/// Banner text for a failed synthesis. The error Display already carries the
/// diagnostic (status code, raw reply), so this only adds the Chinese lead-in.
fn synth_failure_banner(e: &SynthError) -> String {
  format!("出题失败：{e}")
}

/// Turn pasted material into a fresh batch. Blank material is a silent no-op;
/// any failure leaves the current batch alone and reports banner text.
#[instrument(level = "info", skip(state, material), fields(material_len = material.len()))]
pub async fn ingest_material(state: &AppState, material: &str, count: Option<u32>) -> IngestOut {
  if material.trim().is_empty() {
    debug!(target: "quiz", "Blank material; nothing to ingest.");
    return IngestOut { loaded: 0, error: None };
  }
  let count = clamp_count(count);

  match synthesize_questions(&state.gemini, &state.prompts, material, count).await {
    Ok(questions) => {
      let loaded = questions.len();
      state.quiz.write().await.load(questions);
      info!(target: "quiz", loaded, "Loaded fresh question batch.");
      IngestOut { loaded, error: None }
    }
    Err(e) => {
      error!(target: "quiz", error = %e, "Question synthesis failed; keeping the current batch.");
      IngestOut { loaded: 0, error: Some(synth_failure_banner(&e)) }
    }
  }
}

#[instrument(level = "debug", skip(state))]
pub async fn drill_view(state: &AppState) -> DrillOut {
  view_of(&*state.quiz.read().await)
}

/// Grade a choice against the current question. With nothing to grade the
/// verdict carries banner text instead of a reveal.
#[instrument(level = "info", skip(state, choice), fields(choice_len = choice.len()))]
pub async fn submit_choice(state: &AppState, choice: &str) -> VerdictOut {
  let mut quiz = state.quiz.write().await;
  match quiz.submit(choice) {
    Some(v) => {
      info!(target: "quiz", correct = v.correct, mistakes = quiz.mistake_count(), "Graded submission.");
      VerdictOut {
        correct: v.correct,
        answer: v.question.answer.clone(),
        explanation: v.question.explanation.clone(),
        suggestion: v.question.suggestion.clone(),
        mistakes: quiz.mistake_count(),
      }
    }
    None => {
      warn!(target: "quiz", "Submission with no current question.");
      VerdictOut {
        correct: false,
        answer: String::new(),
        explanation: "当前没有可作答的题目。".into(),
        suggestion: String::new(),
        mistakes: quiz.mistake_count(),
      }
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn advance_drill(state: &AppState) -> DrillOut {
  let mut quiz = state.quiz.write().await;
  quiz.advance();
  view_of(&quiz)
}

/// Drop the batch and return to the idle view. The mistake book survives.
#[instrument(level = "info", skip(state))]
pub async fn restart_drill(state: &AppState) -> DrillOut {
  let mut quiz = state.quiz.write().await;
  quiz.reset();
  info!(target: "quiz", mistakes = quiz.mistake_count(), "Session restarted.");
  view_of(&quiz)
}

#[instrument(level = "debug", skip(state))]
pub async fn mistake_book(state: &AppState) -> MistakesOut {
  book_of(&*state.quiz.read().await)
}

/// Remove one mistake entry. Out-of-range indexes are logged and ignored;
/// either way the reply is the current book.
#[instrument(level = "info", skip(state))]
pub async fn forget_mistake(state: &AppState, index: usize) -> MistakesOut {
  let mut quiz = state.quiz.write().await;
  if quiz.forget(index) {
    info!(target: "quiz", index, remaining = quiz.mistake_count(), "Removed mistake entry.");
  } else {
    warn!(target: "quiz", index, total = quiz.mistake_count(), "Ignoring forget for out-of-range index.");
  }
  book_of(&quiz)
}

// -------- View builders --------

fn view_of(quiz: &QuizSession) -> DrillOut {
  DrillOut {
    complete: quiz.is_complete(),
    index: quiz.cursor(),
    total: quiz.total(),
    mistakes: quiz.mistake_count(),
    question: quiz.current().map(|q| to_question_out(q)),
  }
}

fn book_of(quiz: &QuizSession) -> MistakesOut {
  let entries: Vec<_> = quiz
    .mistakes()
    .iter()
    .enumerate()
    .map(|(i, q)| to_mistake_out(i, q))
    .collect();
  MistakesOut { total: entries.len(), entries }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Question;

  fn sample_q(text: &str, answer: &str) -> Question {
    Question {
      question: text.to_string(),
      options: vec![
        "A. 货币资金".into(),
        "B. 固定资产".into(),
        "C. 无形资产".into(),
        "D. 长期待摊费用".into(),
      ],
      answer: answer.to_string(),
      explanation: "货币资金属于流动资产。".into(),
      suggestion: "复习资产负债表的列报分类。".into(),
    }
  }

  fn test_state() -> AppState {
    AppState::new().unwrap()
  }

  #[test]
  fn count_defaults_to_three_and_clamps_to_the_range() {
    assert_eq!(clamp_count(None), 3);
    assert_eq!(clamp_count(Some(0)), 1);
    assert_eq!(clamp_count(Some(7)), 7);
    assert_eq!(clamp_count(Some(99)), 10);
  }

  #[test]
  fn rate_limit_banners_name_the_status_code() {
    let err = SynthError::Model(crate::error::ModelError::Protocol {
      status: reqwest::StatusCode::TOO_MANY_REQUESTS,
      body: r#"{"error": {"code": 429, "message": "Resource has been exhausted"}}"#.into(),
    });
    let banner = synth_failure_banner(&err);
    assert!(banner.contains("429"));
    assert!(banner.contains("出题失败"));
  }

  #[test]
  fn unusable_batch_banners_show_the_model_reply() {
    let err = SynthError::NoValidItems { raw: r#"[{"answer":"E"}]"#.into() };
    let banner = synth_failure_banner(&err);
    assert!(banner.contains("请调整材料后重试"));
    assert!(banner.contains(r#"[{"answer":"E"}]"#));
  }

  #[tokio::test]
  async fn blank_material_is_a_silent_no_op() {
    let state = test_state();
    state.quiz.write().await.load(vec![sample_q("甲", "A")]);

    let out = ingest_material(&state, "   \n\t", None).await;
    assert_eq!(out.loaded, 0);
    assert!(out.error.is_none());

    let view = drill_view(&state).await;
    assert_eq!(view.total, 1);
    assert_eq!(view.index, 0);
  }

  #[tokio::test]
  async fn submitting_into_an_empty_session_reports_banner_text() {
    let state = test_state();
    let verdict = submit_choice(&state, "A").await;
    assert!(!verdict.correct);
    assert!(verdict.explanation.contains("没有可作答"));
    assert_eq!(verdict.mistakes, 0);
  }

  #[tokio::test]
  async fn wrong_then_advance_walks_to_the_completed_view() {
    let state = test_state();
    state
      .quiz
      .write()
      .await
      .load(vec![sample_q("甲", "A"), sample_q("乙", "B")]);

    let verdict = submit_choice(&state, "C").await;
    assert!(!verdict.correct);
    assert_eq!(verdict.answer, "A");
    assert_eq!(verdict.mistakes, 1);

    let view = advance_drill(&state).await;
    assert_eq!(view.index, 1);
    assert!(!view.complete);

    let view = advance_drill(&state).await;
    assert!(view.complete);
    assert!(view.question.is_none());
    assert_eq!(view.index, view.total);
  }

  #[tokio::test]
  async fn restart_clears_the_batch_but_not_the_book() {
    let state = test_state();
    state.quiz.write().await.load(vec![sample_q("甲", "A")]);
    submit_choice(&state, "D").await;

    let view = restart_drill(&state).await;
    assert_eq!(view.total, 0);
    assert!(!view.complete);
    assert!(view.question.is_none());
    assert_eq!(view.mistakes, 1);

    let book = mistake_book(&state).await;
    assert_eq!(book.total, 1);
    assert_eq!(book.entries[0].answer, "A");
  }

  #[tokio::test]
  async fn forgetting_out_of_range_leaves_the_book_alone() {
    let state = test_state();
    state.quiz.write().await.load(vec![sample_q("甲", "A")]);
    submit_choice(&state, "B").await;

    let book = forget_mistake(&state, 9).await;
    assert_eq!(book.total, 1);

    let book = forget_mistake(&state, 0).await;
    assert_eq!(book.total, 0);
  }
}
