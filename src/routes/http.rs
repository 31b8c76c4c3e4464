//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; logs carry sizes and outcomes, never material.

use std::sync::Arc;
use axum::{extract::State, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(material_len = body.material.len(), requested = ?body.count))]
pub async fn http_post_ingest(
  State(state): State<Arc<AppState>>,
  Json(body): Json<IngestIn>,
) -> impl IntoResponse {
  let out = ingest_material(&state, &body.material, body.count).await;
  info!(target: "quiz", loaded = out.loaded, ok = out.error.is_none(), "HTTP ingest handled");
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_drill(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(drill_view(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(choice_len = body.choice.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitIn>,
) -> impl IntoResponse {
  let verdict = submit_choice(&state, &body.choice).await;
  info!(target: "quiz", correct = verdict.correct, mistakes = verdict.mistakes, "HTTP submit graded");
  Json(verdict)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_advance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(advance_drill(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_restart(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(restart_drill(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_mistakes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(mistake_book(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(index = body.index))]
pub async fn http_post_forget(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ForgetIn>,
) -> impl IntoResponse {
  Json(forget_mistake(&state, body.index).await)
}
