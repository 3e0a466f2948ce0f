//! Run-scoped pipeline state.
//!
//! One state bag per analysis run: created at run start, appended to by
//! each stage in sequence, discarded with the run. Never shared across
//! concurrent runs.

use std::collections::HashMap;

use uuid::Uuid;

/// Placeholder substituted for an absent state key when rendering a stage
/// instruction. Downstream stages see an empty JSON object instead of an
/// error, so a partially failed run can still produce output.
pub const EMPTY_PLACEHOLDER: &str = "{}";

/// Append-only key/value bag threading stage outputs through a run.
#[derive(Debug)]
pub struct PipelineState {
    run_id: Uuid,
    values: HashMap<String, String>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            values: HashMap::new(),
        }
    }

    /// Isolated identity of this run (log correlation only).
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record a stage's output. Keys are globally unique per run; a stage
    /// writes its declared output key exactly once.
    pub fn insert(&mut self, key: &str, value: String) {
        debug_assert!(
            !self.values.contains_key(key),
            "stage output key '{key}' written twice in one run"
        );
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The stored value, or the `{}` placeholder when the key was never
    /// written (upstream stage produced nothing).
    pub fn value_or_placeholder(&self, key: &str) -> &str {
        self.get(key).unwrap_or(EMPTY_PLACEHOLDER)
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut state = PipelineState::new();
        state.insert("parsed_document", "{\"clauses\":[]}".into());
        assert_eq!(state.get("parsed_document"), Some("{\"clauses\":[]}"));
    }

    #[test]
    fn absent_key_yields_placeholder() {
        let state = PipelineState::new();
        assert_eq!(state.value_or_placeholder("risk_analysis"), "{}");
    }

    #[test]
    fn runs_have_distinct_identity() {
        assert_ne!(PipelineState::new().run_id(), PipelineState::new().run_id());
    }
}
