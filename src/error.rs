use std::fmt;

/// Errors raised by the preparation pipeline.
///
/// `Configuration` and `ResourceLoad` are fatal and surface before any
/// document is touched. `SkippableDocument` is isolated to a single document
/// and never aborts a batch.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to load {resource}: {reason}")]
    ResourceLoad { resource: String, reason: String },

    #[error("skipped document '{id}': {reason}")]
    SkippableDocument { id: String, reason: SkipReason },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PrepError {
    pub fn config(msg: impl Into<String>) -> Self {
        PrepError::Configuration(msg.into())
    }

    pub fn resource(resource: impl Into<String>, reason: impl fmt::Display) -> Self {
        PrepError::ResourceLoad {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub fn skip(id: impl Into<String>, reason: SkipReason) -> Self {
        PrepError::SkippableDocument {
            id: id.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    Unreadable { detail: String },
    TooShort { chars: usize, min_chars: usize },
    DuplicateId { path: String },
    TaskFailed { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable { detail } => write!(f, "unreadable ({detail})"),
            SkipReason::TooShort { chars, min_chars } => {
                write!(f, "too short ({chars} < {min_chars} chars)")
            }
            SkipReason::DuplicateId { path } => {
                write!(f, "document id already taken, ignoring {path}")
            }
            SkipReason::TaskFailed { detail } => write!(f, "processing failed ({detail})"),
        }
    }
}

pub type PrepResult<T> = std::result::Result<T, PrepError>;
