//! Axum route handlers for the Evaluation API.
//!
//! One endpoint per action button. Each handler reads the multipart form,
//! runs the pipeline, and handles its declared error conditions
//! independently — a failure in one action never affects another.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::evaluation::prompts::EvalAction;
use crate::evaluation::{evaluate, EvaluationOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Parsed multipart form shared by all three actions.
struct EvaluationForm {
    resume: Option<Bytes>,
    job_description: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub action: &'static str,
    pub evaluation: String,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub action: &'static str,
    pub evaluation: String,
    /// `null` when no parseable percentage appeared in the model output.
    pub percent_match: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations/review
///
/// Recruiter-style evaluation of the resume against the job description.
pub async fn handle_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let outcome = run(EvalAction::Review, &state, multipart).await?;
    Ok(Json(EvaluationResponse {
        action: outcome.action.as_str(),
        evaluation: outcome.evaluation,
    }))
}

/// POST /api/v1/evaluations/skills
///
/// Skill-improvement suggestions for the role.
pub async fn handle_skills(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let outcome = run(EvalAction::Skills, &state, multipart).await?;
    Ok(Json(EvaluationResponse {
        action: outcome.action.as_str(),
        evaluation: outcome.evaluation,
    }))
}

/// POST /api/v1/evaluations/match
///
/// ATS-style percentage match. The percentage is scraped from the model's
/// free text; when absent the response carries `percent_match: null` rather
/// than failing.
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let outcome = run(EvalAction::Match, &state, multipart).await?;
    Ok(Json(MatchResponse {
        action: outcome.action.as_str(),
        evaluation: outcome.evaluation,
        percent_match: outcome.percent_match,
    }))
}

async fn run(
    action: EvalAction,
    state: &AppState,
    multipart: Multipart,
) -> Result<EvaluationOutcome, AppError> {
    let form = read_form(multipart).await?;
    evaluate(
        action,
        form.resume,
        form.job_description,
        state.renderer.clone(),
        state.model.as_ref(),
    )
    .await
}

/// Reads the multipart body. The upload surface accepts exactly one file,
/// `resume`, of MIME type application/pdf, plus a free-text
/// `job_description`. Unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<EvaluationForm, AppError> {
    let mut resume = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                if let Some(content_type) = field.content_type() {
                    if content_type != "application/pdf" {
                        return Err(AppError::Validation(format!(
                            "resume must be application/pdf, got {content_type}"
                        )));
                    }
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read resume: {e}")))?;
                resume = Some(bytes);
            }
            Some("job_description") => {
                job_description = field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read job_description: {e}"))
                })?;
            }
            _ => {}
        }
    }

    Ok(EvaluationForm {
        resume,
        job_description,
    })
}
