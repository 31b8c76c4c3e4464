//! Drill-session state: the loaded batch, a cursor, and the mistake book.
//!
//! Grading never moves the cursor; advancing is its own operation so the
//! learner can sit with the explanation as long as they like. The mistake
//! book outlives batches: loading or restarting touches questions and
//! cursor only.

use std::sync::Arc;

use crate::domain::Question;

/// Outcome of grading one submission.
pub struct Verdict {
  pub correct: bool,
  /// The question that was graded, for building the reveal.
  pub question: Arc<Question>,
}

#[derive(Default)]
pub struct QuizSession {
  questions: Vec<Arc<Question>>,
  cursor: usize,
  mistakes: Vec<Arc<Question>>,
}

impl QuizSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the loaded batch and rewind to the first question. The mistake
  /// book is deliberately left alone.
  pub fn load(&mut self, questions: Vec<Question>) {
    self.questions = questions.into_iter().map(Arc::new).collect();
    self.cursor = 0;
  }

  pub fn current(&self) -> Option<&Arc<Question>> {
    self.questions.get(self.cursor)
  }

  /// Grade `choice` against the current question. Returns None when there is
  /// nothing to grade. A wrong answer is recorded in the mistake book unless
  /// an identical question (by content) is already there; the cursor stays
  /// put either way.
  pub fn submit(&mut self, choice: &str) -> Option<Verdict> {
    let current = self.questions.get(self.cursor)?.clone();
    let picked = choice.trim().chars().next();
    let correct = match (picked, current.answer_letter()) {
      (Some(p), Some(a)) => p == a,
      _ => false,
    };
    if !correct && !self.mistakes.iter().any(|m| **m == *current) {
      self.mistakes.push(current.clone());
    }
    Some(Verdict { correct, question: current })
  }

  /// Move to the next question, stopping one past the last. That resting
  /// position is the completed state.
  pub fn advance(&mut self) {
    if self.cursor < self.questions.len() {
      self.cursor += 1;
    }
  }

  /// Drop the batch and rewind, keeping the mistake book.
  pub fn reset(&mut self) {
    self.questions.clear();
    self.cursor = 0;
  }

  /// Remove one entry from the mistake book. False when `index` is out of
  /// range.
  pub fn forget(&mut self, index: usize) -> bool {
    if index < self.mistakes.len() {
      self.mistakes.remove(index);
      true
    } else {
      false
    }
  }

  pub fn mistakes(&self) -> &[Arc<Question>] {
    &self.mistakes
  }

  pub fn mistake_count(&self) -> usize {
    self.mistakes.len()
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn total(&self) -> usize {
    self.questions.len()
  }

  /// True once every question in a non-empty batch has been advanced past.
  pub fn is_complete(&self) -> bool {
    !self.questions.is_empty() && self.cursor >= self.questions.len()
  }
}
