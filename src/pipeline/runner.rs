//! Sequential pipeline execution and candidate resolution.
//!
//! Stages run strictly in declared order over one run-scoped state bag;
//! a failure at any interior stage aborts the run and discards partial
//! state. The terminal stage's output is the canonical candidate; a
//! secondary (augmentation) output contributes its optional sections, or
//! stands in entirely when the terminal stage wrote nothing.

use crate::engine::{Attachment, CompletionEngine};

use super::stage::run_stage;
use super::stages::PipelinePlan;
use super::state::PipelineState;
use super::PipelineError;

/// Optional report sections a secondary output may contribute.
const OPTIONAL_SECTIONS: &[&str] = &["safeClausesSummary", "comprehension"];

/// Execute a plan and return the raw candidate report text.
pub async fn run_pipeline(
    engine: &dyn CompletionEngine,
    model: &str,
    plan: &PipelinePlan,
    reference: &str,
    attachment: &Attachment,
) -> Result<String, PipelineError> {
    let mut state = PipelineState::new();
    tracing::info!(run_id = %state.run_id(), stages = plan.stages.len(), "Pipeline run starting");

    for spec in plan.stages {
        run_stage(engine, model, spec, &mut state, reference, Some(attachment)).await?;
    }

    let terminal = state.get(plan.terminal_key);
    let secondary = plan.secondary_key.and_then(|key| state.get(key));

    match (terminal, secondary) {
        (Some(terminal), Some(secondary)) => Ok(merge_candidates(terminal, secondary)),
        (Some(terminal), None) => Ok(terminal.to_string()),
        (None, Some(secondary)) => {
            tracing::info!("Terminal key unset; using secondary output");
            Ok(secondary.to_string())
        }
        (None, None) => Err(PipelineError::EmptyResult),
    }
}

/// Merge a secondary output's optional sections onto the terminal
/// candidate. Core sections of the terminal output always win; when
/// either side is unparsable the terminal text passes through untouched.
fn merge_candidates(terminal: &str, secondary: &str) -> String {
    let (Ok(mut base), Ok(extra)) = (
        crate::report::parse_report_candidate(terminal),
        crate::report::parse_report_candidate(secondary),
    ) else {
        return terminal.to_string();
    };

    let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) else {
        return terminal.to_string();
    };

    for section in OPTIONAL_SECTIONS {
        if !base_obj.contains_key(*section) {
            if let Some(value) = extra_obj.get(*section) {
                base_obj.insert((*section).to_string(), value.clone());
            }
        }
    }

    serde_json::to_string(&base).unwrap_or_else(|_| terminal.to_string())
}
