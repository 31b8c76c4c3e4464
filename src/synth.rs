//! Question synthesis: turn pasted study material into single-choice items.
//!
//! The model is asked for a bare JSON array. Replies are cleaned of markdown
//! code fences, decoded item by item, and anything malformed is dropped with
//! a warning rather than failing the whole batch.

use tracing::{debug, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::Question;
use crate::error::SynthError;
use crate::gemini::Gemini;
use crate::util::{fill_template, truncate_chars};

/// Material beyond this many characters is clipped before prompting.
pub const MATERIAL_CHAR_LIMIT: usize = 4000;

const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Render the generation prompt for `material`, clipping it to
/// [`MATERIAL_CHAR_LIMIT`] characters first.
pub fn build_generation_prompt(prompts: &Prompts, material: &str, count: u32) -> String {
  let clipped = truncate_chars(material, MATERIAL_CHAR_LIMIT);
  if clipped.len() < material.len() {
    debug!(target: "quiz", material_chars = material.chars().count(), limit = MATERIAL_CHAR_LIMIT, "material clipped for prompting");
  }
  let count_s = count.to_string();
  fill_template(&prompts.generation_template, &[("count", &count_s), ("material", clipped)])
}

/// Remove markdown code fences the model wraps JSON in despite being told
/// not to. "```json" goes first so the bare "```" pass cannot orphan a
/// "json" tag.
pub fn strip_code_fences(raw: &str) -> String {
  raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// One well-formed item: four options labelled in order, answer naming one
/// of them.
fn validate_item(q: &Question) -> Result<(), String> {
  if !OPTION_LABELS.contains(&q.answer.as_str()) {
    return Err(format!("answer {:?} is not one of A/B/C/D", q.answer));
  }
  if q.options.len() != OPTION_LABELS.len() {
    return Err(format!("expected 4 options, got {}", q.options.len()));
  }
  for (label, opt) in OPTION_LABELS.iter().zip(&q.options) {
    if !opt.starts_with(&format!("{label}.")) {
      return Err(format!("option {:?} does not start with \"{label}.\"", opt));
    }
  }
  if q.question.trim().is_empty() {
    return Err("empty question text".into());
  }
  Ok(())
}

/// Decode a model reply into validated questions.
///
/// The reply must be a JSON array once fences are stripped; that failing is
/// a [`SynthError::Parse`] carrying the raw reply. Individual elements that
/// do not decode or do not validate are dropped with a warning; if nothing
/// survives, that is a [`SynthError::NoValidItems`] carrying the reply. If
/// the model over-produces, the batch is cut back to `count`.
pub fn parse_question_batch(raw: &str, count: u32) -> Result<Vec<Question>, SynthError> {
  let cleaned = strip_code_fences(raw);
  let items: Vec<serde_json::Value> = serde_json::from_str(&cleaned)
    .map_err(|source| SynthError::Parse { source, raw: raw.to_string() })?;

  let mut questions = Vec::with_capacity(items.len());
  for (idx, item) in items.into_iter().enumerate() {
    let mut q: Question = match serde_json::from_value(item) {
      Ok(q) => q,
      Err(err) => {
        warn!(target: "quiz", index = idx, %err, "dropping item that does not decode");
        continue;
      }
    };
    q.answer = q.answer.trim().to_string();
    if let Err(reason) = validate_item(&q) {
      warn!(target: "quiz", index = idx, %reason, "dropping item that does not validate");
      continue;
    }
    questions.push(q);
  }

  if questions.is_empty() {
    return Err(SynthError::NoValidItems { raw: raw.to_string() });
  }

  let wanted = count as usize;
  if questions.len() > wanted {
    warn!(target: "quiz", produced = questions.len(), wanted, "model over-produced; truncating the batch");
    questions.truncate(wanted);
  }
  Ok(questions)
}

/// Full pipeline: prompt the model with the clipped material and decode its
/// reply. A successful batch always holds at least one question.
#[instrument(level = "info", skip(gemini, prompts, material), fields(material_len = material.len()))]
pub async fn synthesize_questions(
  gemini: &Gemini,
  prompts: &Prompts,
  material: &str,
  count: u32,
) -> Result<Vec<Question>, SynthError> {
  let prompt = build_generation_prompt(prompts, material, count);
  let reply = gemini.complete(&prompt).await?;
  let questions = parse_question_batch(&reply, count)?;
  info!(target: "quiz", kept = questions.len(), requested = count, "synthesized question batch");
  Ok(questions)
}
