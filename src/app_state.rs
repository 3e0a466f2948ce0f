//! Shared application state.
//!
//! Built once at startup and cloned into every request handler. All
//! contents are read-only after construction: the pre-warmed engine
//! handle, the reference and fallback stores, and the producers wired on
//! top of them. Per-request mutable state lives inside each orchestration
//! run, never here.

use std::sync::Arc;

use thiserror::Error;

use crate::comprehension::ComprehensionGenerator;
use crate::config::Config;
use crate::engine::{CompletionEngine, GeminiClient};
use crate::fallback::{FallbackOrchestrator, FallbackStore, FallbackStoreError};
use crate::fraud::FraudCheck;
use crate::reference::{ReferenceError, ReferenceStore};

/// Startup failures. All of these are deployment errors; the process
/// refuses to start rather than serving without its data files.
#[derive(Error, Debug)]
pub enum StateError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Fallback(#[from] FallbackStoreError),
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<FallbackOrchestrator>,
    pub comprehension: Arc<ComprehensionGenerator>,
    pub fraud: Arc<FraudCheck>,
    pub fallback: Arc<FallbackStore>,
    pub api_key_set: bool,
}

impl AppState {
    /// Build production state: load data files (fail fast), construct the
    /// engine client once, wire the producers.
    pub fn initialize(config: &Config) -> Result<Self, StateError> {
        let reference = Arc::new(ReferenceStore::load(&config.standard_contract_path())?);
        let fallback = Arc::new(FallbackStore::load(&config.fallback_path())?);
        let engine: Arc<dyn CompletionEngine> = Arc::new(GeminiClient::new(
            &config.engine_base_url,
            &config.api_key,
            config.engine_request_timeout,
        ));
        Ok(Self::with_engine(engine, reference, fallback, config))
    }

    /// Wire state around an arbitrary engine (tests inject a mock here).
    pub fn with_engine(
        engine: Arc<dyn CompletionEngine>,
        reference: Arc<ReferenceStore>,
        fallback: Arc<FallbackStore>,
        config: &Config,
    ) -> Self {
        Self {
            orchestrator: Arc::new(FallbackOrchestrator::new(
                Arc::clone(&engine),
                reference,
                Arc::clone(&fallback),
                config,
            )),
            comprehension: Arc::new(ComprehensionGenerator::new(
                Arc::clone(&engine),
                &config.model_flash,
            )),
            fraud: Arc::new(FraudCheck::new(engine, &config.model_flash)),
            fallback,
            api_key_set: !config.api_key.is_empty(),
        }
    }
}
