//! The evaluation pipeline: ingest the uploaded resume, send the ordered
//! triple `[instruction, page image, job description]` to the model, and
//! post-process the result for the match action.
//!
//! There is no cache keyed on document content or action — every request
//! re-reads the upload and re-renders its first page from scratch.

pub mod handlers;
pub mod percent;
pub mod prompts;

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::ingest::{IngestError, PageRenderer};
use crate::model_client::EvaluationModel;
use crate::evaluation::prompts::EvalAction;

/// Result of one evaluation action.
#[derive(Debug)]
pub struct EvaluationOutcome {
    pub action: EvalAction,
    /// The model's free-text response, verbatim.
    pub evaluation: String,
    /// Only populated for `EvalAction::Match`. `None` means no parseable
    /// percentage appeared in the text — a warning-grade outcome.
    pub percent_match: Option<u32>,
}

/// Runs one evaluation action end to end.
///
/// A missing upload aborts before any rendering or model call is made.
pub async fn evaluate(
    action: EvalAction,
    resume: Option<Bytes>,
    job_description: String,
    renderer: Arc<dyn PageRenderer>,
    model: &dyn EvaluationModel,
) -> Result<EvaluationOutcome, AppError> {
    let pdf_bytes = resume.ok_or(IngestError::MissingUpload)?;

    debug!(
        action = action.as_str(),
        pdf_len = pdf_bytes.len(),
        jd_len = job_description.len(),
        "starting evaluation"
    );

    // pdfium is not async-safe; rasterize on the blocking pool.
    let page = tokio::task::spawn_blocking(move || renderer.render_first_page(&pdf_bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    let evaluation = model
        .generate(action.instruction(), &page, &job_description)
        .await?;

    let percent_match = if action == EvalAction::Match {
        let found = percent::extract_percentage(&evaluation);
        if found.is_none() {
            warn!("no percentage figure found in match evaluation");
        }
        found
    } else {
        None
    };

    Ok(EvaluationOutcome {
        action,
        evaluation,
        percent_match,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::ingest::{IngestError, InlinePage, PageRenderer, PAGE_MIME_TYPE};
    use crate::model_client::{EvaluationModel, ModelError};

    /// Counts render calls and returns a fixed page payload.
    struct FakeRenderer {
        calls: AtomicUsize,
    }

    impl FakeRenderer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl PageRenderer for FakeRenderer {
        fn render_first_page(&self, pdf_bytes: &[u8]) -> Result<InlinePage, IngestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if pdf_bytes.is_empty() {
                return Err(IngestError::MalformedDocument("empty stream".to_string()));
            }
            Ok(InlinePage {
                mime_type: PAGE_MIME_TYPE.to_string(),
                data: "ZmFrZS1qcGVn".to_string(),
            })
        }
    }

    /// Records every (instruction, page data, job description) triple it sees.
    struct RecordingModel {
        calls: Mutex<Vec<(String, String, String)>>,
        reply: String,
    }

    impl RecordingModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EvaluationModel for RecordingModel {
        async fn generate(
            &self,
            instruction: &str,
            page: &InlinePage,
            job_description: &str,
        ) -> Result<String, ModelError> {
            self.calls.lock().unwrap().push((
                instruction.to_string(),
                page.data.clone(),
                job_description.to_string(),
            ));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_missing_upload_makes_no_model_call() {
        let renderer = FakeRenderer::new();
        let model = RecordingModel::new("should never be seen");

        let err = evaluate(
            EvalAction::Review,
            None,
            "some jd".to_string(),
            renderer.clone(),
            model.as_ref(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::MissingUpload));
        assert_eq!(model.call_count(), 0);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_document_makes_no_model_call() {
        let renderer = FakeRenderer::new();
        let model = RecordingModel::new("should never be seen");

        let err = evaluate(
            EvalAction::Review,
            Some(Bytes::new()),
            "some jd".to_string(),
            renderer,
            model.as_ref(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::MalformedDocument(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_three_actions_make_three_independent_calls() {
        let renderer = FakeRenderer::new();
        let model = RecordingModel::new("Looks good. Percentage Match: 82%");
        let pdf = Bytes::from_static(b"%PDF-fake");
        let jd = "Senior Rust Engineer".to_string();

        for action in [EvalAction::Review, EvalAction::Skills, EvalAction::Match] {
            evaluate(action, Some(pdf.clone()), jd.clone(), renderer.clone(), model.as_ref())
                .await
                .unwrap();
        }

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        // Same image payload and JD on every call...
        assert!(calls.iter().all(|(_, page, j)| page == "ZmFrZS1qcGVn" && j == &jd));
        // ...but a different instruction each time.
        assert_ne!(calls[0].0, calls[1].0);
        assert_ne!(calls[1].0, calls[2].0);
        // No cached render: the document was re-rasterized per click.
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_match_action_extracts_percentage() {
        let renderer = FakeRenderer::new();
        let model = RecordingModel::new("Percentage Match: 73%. Also 91% on keywords.");

        let outcome = evaluate(
            EvalAction::Match,
            Some(Bytes::from_static(b"%PDF-fake")),
            String::new(),
            renderer,
            model.as_ref(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.percent_match, Some(73));
    }

    #[tokio::test]
    async fn test_match_without_percentage_is_not_an_error() {
        let renderer = FakeRenderer::new();
        let model = RecordingModel::new("A thoughtful but entirely numberless reply.");

        let outcome = evaluate(
            EvalAction::Match,
            Some(Bytes::from_static(b"%PDF-fake")),
            String::new(),
            renderer,
            model.as_ref(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.percent_match, None);
        assert!(!outcome.evaluation.is_empty());
    }

    #[tokio::test]
    async fn test_non_match_actions_skip_percentage_extraction() {
        let renderer = FakeRenderer::new();
        let model = RecordingModel::new("A glowing review with a 95% somewhere in it.");

        let outcome = evaluate(
            EvalAction::Review,
            Some(Bytes::from_static(b"%PDF-fake")),
            String::new(),
            renderer,
            model.as_ref(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.percent_match, None);
    }
}
