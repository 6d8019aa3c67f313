use std::sync::Arc;

use tokio::sync::Mutex;

use crate::agent::backend::GuideBackend;
use crate::error::{PipelineError, UNEXPECTED_FAILURE};
use crate::types::{GuideData, GuideMode};

pub(crate) const REQUEST_MIN_CHARS: usize = 10;
pub(crate) const REQUEST_MAX_CHARS: usize = 200;

/// Result of one submission: data or a single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GuideOutcome {
    Ready(GuideData),
    Failed(String),
}

impl From<Result<GuideData, PipelineError>> for GuideOutcome {
    fn from(result: Result<GuideData, PipelineError>) -> Self {
        match result {
            Ok(data) => Self::Ready(data),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

pub(crate) fn validate_request(request: &str) -> Result<(), PipelineError> {
    let len = request.chars().count();
    if len < REQUEST_MIN_CHARS {
        return Err(PipelineError::Validation(format!(
            "Your request must be at least {REQUEST_MIN_CHARS} characters."
        )));
    }
    if len > REQUEST_MAX_CHARS {
        return Err(PipelineError::Validation(format!(
            "Your request must not be longer than {REQUEST_MAX_CHARS} characters."
        )));
    }
    Ok(())
}

/// Validates a request, calls the backend and turns every failure into a
/// message. At most one submission runs at a time; there is no retry and no
/// cancellation.
pub(crate) struct GuidePipeline<B> {
    backend: B,
    mode: GuideMode,
    in_flight: Mutex<()>,
}

impl<B: GuideBackend> GuidePipeline<B> {
    pub fn new(backend: B, mode: GuideMode) -> Self {
        Self {
            backend,
            mode,
            in_flight: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> GuideMode {
        self.mode
    }

    pub async fn submit(&self, request: &str) -> GuideOutcome {
        let result = self.run(request).await;
        if let Err(err) = &result {
            match err {
                PipelineError::Unexpected(cause) => {
                    tracing::error!(error = %format!("{cause:#}"), "guide pipeline failed");
                }
                other => tracing::warn!(kind = other.kind(), "{other}"),
            }
        }
        result.into()
    }

    pub async fn run(&self, request: &str) -> Result<GuideData, PipelineError> {
        validate_request(request)?;
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(PipelineError::Busy);
        };
        tracing::info!(mode = self.mode.as_str(), chars = request.chars().count(), "generating guide");

        match self.mode {
            GuideMode::Steps => {
                let data = self.backend.generate_guide(request).await?;
                if data.is_empty() {
                    return Err(PipelineError::Generation);
                }
                Ok(data)
            }
            GuideMode::Tree => {
                let guide = self.backend.generate_text(request).await?;
                if guide.trim().is_empty() {
                    return Err(PipelineError::Generation);
                }
                let tree = self.backend.format_tree(&guide).await?;
                if tree.trim().is_empty() {
                    return Err(PipelineError::Formatting);
                }
                Ok(GuideData::Tree { tree })
            }
        }
    }
}

impl<B: GuideBackend + 'static> GuidePipeline<B> {
    /// `submit` on its own task. A task that panics or is cancelled yields
    /// the generic failure instead of no outcome at all.
    pub async fn submit_detached(self: Arc<Self>, request: String) -> GuideOutcome {
        match tokio::spawn(async move { self.submit(&request).await }).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "guide worker stopped");
                GuideOutcome::Failed(UNEXPECTED_FAILURE.to_string())
            }
        }
    }
}
