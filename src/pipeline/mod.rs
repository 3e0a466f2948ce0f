pub mod runner;
pub mod stage;
pub mod stages;
pub mod state;

pub use runner::*;
pub use stage::*;
pub use stages::*;
pub use state::*;

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        source: EngineError,
    },

    #[error("pipeline produced no report candidate")]
    EmptyResult,
}
