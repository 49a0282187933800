//! Codec configuration: file-name extension and pasteboard content type.

use serde::{Deserialize, Serialize};

use crate::error::{AttachError, Result};

/// Extension appended to every suggested attachment file name.
pub const DEFAULT_FILE_EXTENSION: &str = "fluencyattachment";

/// Content-type identifier the host registers on the system pasteboard.
pub const DEFAULT_CONTENT_TYPE: &str = "com.noahgilmore.fluencyattachment";

/// Settings shared by the codec and the pasteboard helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachConfig {
    /// Suffix identifying the content family, without the leading dot.
    pub file_extension: String,
    pub content_type: String,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl AttachConfig {
    /// Parse a JSON config document. Missing keys fall back to defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: AttachConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_extension.is_empty() {
            return Err(AttachError::Config("file extension must not be empty".into()));
        }
        if self
            .file_extension
            .chars()
            .any(|c| c == '.' || c == '/' || c == '\\')
        {
            return Err(AttachError::Config(format!(
                "file extension \"{}\" must not contain dots or path separators",
                self.file_extension
            )));
        }
        if self.content_type.is_empty() {
            return Err(AttachError::Config("content type must not be empty".into()));
        }
        Ok(())
    }

    /// `.<extension>`, the suffix checked when recognizing attachment files.
    pub fn dotted_extension(&self) -> String {
        format!(".{}", self.file_extension)
    }
}
