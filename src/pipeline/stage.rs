//! Stage specification and execution.
//!
//! A stage renders its instruction template against the accumulated run
//! state, calls the completion engine once, and stores the raw response
//! text under its declared output key. Engine transport errors are not
//! swallowed here — they abort the whole run one level up.

use crate::engine::{Attachment, CompletionEngine, CompletionRequest, EngineTool};

use super::state::PipelineState;
use super::PipelineError;

/// Marker in an instruction template replaced with the reference
/// (standard contract) text at render time.
pub const REFERENCE_MARKER: &str = "{{standard_contract}}";

/// Declaration of one analysis stage.
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
    pub name: &'static str,
    /// Instruction template with `{{key}}` markers for each input key.
    pub instruction: &'static str,
    /// State keys this stage may read (written by strictly earlier stages).
    pub input_keys: &'static [&'static str],
    /// State key this stage writes.
    pub output_key: &'static str,
    /// Whether the uploaded document is attached to the engine call.
    pub attach_document: bool,
    pub temperature: f32,
    /// Auxiliary tools handed to the engine for this stage.
    pub tools: &'static [EngineTool],
}

/// Render a stage instruction: each declared input key's `{{key}}` marker
/// becomes the stored state value, or the literal `{}` when the key was
/// never written; the reference marker becomes the reference text.
pub fn render_instruction(spec: &StageSpec, state: &PipelineState, reference: &str) -> String {
    let mut rendered = spec.instruction.to_string();
    for key in spec.input_keys {
        let marker = format!("{{{{{key}}}}}");
        let value = state.value_or_placeholder(key);
        rendered = rendered.replace(&marker, value);
    }
    rendered.replace(REFERENCE_MARKER, reference)
}

/// Execute one stage against the engine, appending its output to `state`.
///
/// An empty engine response leaves the output key unset; downstream
/// stages observe the `{}` placeholder instead.
pub async fn run_stage(
    engine: &dyn CompletionEngine,
    model: &str,
    spec: &StageSpec,
    state: &mut PipelineState,
    reference: &str,
    attachment: Option<&Attachment>,
) -> Result<(), PipelineError> {
    let instruction = render_instruction(spec, state, reference);

    let mut request = CompletionRequest::new(model, instruction)
        .with_temperature(spec.temperature)
        .with_tools(spec.tools)
        .json();
    if spec.attach_document {
        if let Some(attachment) = attachment {
            request = request.with_attachment(attachment.clone());
        }
    }

    let response = engine
        .complete(request)
        .await
        .map_err(|source| PipelineError::Stage {
            stage: spec.name,
            source,
        })?;

    match response.text {
        Some(text) if !text.trim().is_empty() => {
            tracing::debug!(
                run_id = %state.run_id(),
                stage = spec.name,
                output_key = spec.output_key,
                bytes = text.len(),
                "Stage produced output"
            );
            state.insert(spec.output_key, text);
        }
        _ => {
            tracing::warn!(
                run_id = %state.run_id(),
                stage = spec.name,
                "Stage produced no text; key left unset"
            );
        }
    }
    Ok(())
}
