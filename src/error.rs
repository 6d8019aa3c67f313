use thiserror::Error;

pub(crate) const GENERATION_FAILED: &str =
    "The AI failed to generate a guide. Please try a different request.";
pub(crate) const FORMATTING_FAILED: &str =
    "The AI failed to format the guide into a tree structure.";
pub(crate) const UNEXPECTED_FAILURE: &str =
    "An unexpected error occurred on the server. Please try again later.";
pub(crate) const ALREADY_RUNNING: &str = "A guide is already being generated.";

/// Failures of a guide submission. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", GENERATION_FAILED)]
    Generation,
    #[error("{}", FORMATTING_FAILED)]
    Formatting,
    #[error("{}", ALREADY_RUNNING)]
    Busy,
    /// Cause is logged, never shown.
    #[error("{}", UNEXPECTED_FAILURE)]
    Unexpected(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Generation => "generation",
            Self::Formatting => "formatting",
            Self::Busy => "busy",
            Self::Unexpected(_) => "unexpected",
        }
    }
}
