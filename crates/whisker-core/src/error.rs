/// Core error type for the Whisker editor.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("unsupported story format: {format}")]
    UnsupportedFormat { format: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal problems with the shape of an imported story document.
///
/// These are the only failures an import can produce. Everything else
/// (unknown macros, dangling links, a missing start passage) degrades
/// gracefully into a best-effort document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The document has no story root record (`<tw-storydata>`).
    #[error("Not a valid Twine 2 story document (missing <tw-storydata>)")]
    MissingStoryData,

    /// The story root exists but holds zero passage records.
    #[error("No passages found in Twine story")]
    NoPassages,
}

/// Failure reported by an external script runtime.
///
/// Never escapes the template evaluator; a failing script block renders an
/// error marker instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("script error: {message}")]
pub struct ScriptError {
    pub message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
