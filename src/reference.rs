//! Reference document store — the MOLIT standard lease contract every
//! analysis stage compares against.
//!
//! Loaded and JSON-validated exactly once at startup. A missing or
//! unparsable reference is a deployment error, not a runtime fallback
//! case: no meaningful analysis is possible without the baseline.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("cannot read reference document at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("reference document at {path} is not valid JSON: {detail}")]
    Malformed { path: String, detail: String },
}

/// Process-wide immutable reference document. Shared via `Arc`, never
/// mutated after load.
pub struct ReferenceStore {
    text: String,
}

impl ReferenceStore {
    /// Load and validate the reference document. Called once at startup.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        // Re-serialize pretty so stage prompts always embed a normalized
        // form regardless of how the file on disk is formatted.
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| ReferenceError::Malformed {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        let text = serde_json::to_string_pretty(&value).map_err(|e| ReferenceError::Malformed {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), bytes = text.len(), "Reference document loaded");
        Ok(Self { text })
    }

    /// The cached reference text.
    pub fn get(&self) -> &str {
        &self.text
    }
}
