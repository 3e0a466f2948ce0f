pub mod parser;
pub mod repair;
pub mod validate;

pub use parser::*;
pub use repair::*;
pub use validate::*;

use thiserror::Error;

/// Default risk amount substituted for clauses where the producer left the
/// amount missing or non-numeric (1,000,000 KRW).
pub const DEFAULT_RISK_AMOUNT: i64 = 1_000_000;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("candidate is not valid JSON: {0}")]
    JsonParsing(String),

    #[error("candidate JSON is not an object")]
    NotAnObject,
}
