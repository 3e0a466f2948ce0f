pub mod gemini;
pub mod types;

pub use gemini::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("completion engine unreachable at {0}")]
    Connection(String),

    #[error("completion engine returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("response decoding error: {0}")]
    ResponseDecoding(String),
}
