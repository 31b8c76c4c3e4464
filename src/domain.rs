//! Domain model: the single-choice exam item produced by the synthesizer
//! and consumed by the quiz session.

use serde::{Deserialize, Serialize};

/// A self-contained multiple-choice question.
///
/// Equality is content equality. The mistake book relies on it to hold each
/// item at most once, even across ingest cycles that regenerate identical
/// items from the same material.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  /// Stem text shown to the candidate.
  pub question: String,
  /// Exactly four options, labeled "A. …" through "D. …" in order.
  pub options: Vec<String>,
  /// Letter of the correct option: one of A, B, C, D.
  pub answer: String,
  /// Free text justifying the answer.
  pub explanation: String,
  /// Free text study advice.
  pub suggestion: String,
}

impl Question {
  /// The correct letter as a char, if `answer` is non-empty.
  pub fn answer_letter(&self) -> Option<char> {
    self.answer.chars().next()
  }
}
