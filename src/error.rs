use thiserror::Error;

/// Failure to turn serialized attachment bytes back into a `ContentVariant`.
///
/// Both cases are recoverable: the caller refuses to insert the attachment
/// and reports the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unknown attachment type tag: \"{0}\"")]
    UnknownTypeTag(String),

    #[error("Malformed attachment payload{}: {reason}", tag_suffix(.tag))]
    MalformedPayload {
        /// Tag the payload claimed, when one could be read.
        tag: Option<String>,
        reason: String,
    },
}

fn tag_suffix(tag: &Option<String>) -> String {
    match tag {
        Some(t) => format!(" for \"{t}\""),
        None => String::new(),
    }
}

impl DecodeError {
    pub(crate) fn malformed(tag: Option<&str>, reason: impl Into<String>) -> Self {
        DecodeError::MalformedPayload {
            tag: tag.map(str::to_string),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AttachError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AttachError>;
