//! Environment-derived configuration.
//!
//! Everything operational is overridable through the environment so the
//! same binary runs locally (mock engine base URL, short budgets) and in
//! production. A missing `GEMINI_API_KEY` is not a startup error: attempts
//! against the engine fail and the fallback chain absorbs them.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Leaseguard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upload cap for `/api/analyze` (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the API server binds to. `PORT`, default 8080.
    pub port: u16,
    /// Completion engine API key. `GEMINI_API_KEY`, may be empty.
    pub api_key: String,
    /// Completion engine base URL. `GEMINI_BASE_URL`.
    pub engine_base_url: String,
    /// Directory holding the reference and fallback documents. `DATA_DIR`.
    pub data_dir: PathBuf,
    /// Model for the fast single-shot producer. `MODEL_PRO`.
    pub model_pro: String,
    /// Model for pipeline stages and auxiliary lookups. `MODEL_FLASH`.
    pub model_flash: String,
    /// Wall-clock budget for the fast single-shot attempt.
    pub single_shot_timeout: Duration,
    /// Wall-clock budget for the multi-stage pipeline attempt.
    pub pipeline_timeout: Duration,
    /// Per-request HTTP timeout for the engine client. Longer than any
    /// attempt budget so cancellation is owned by the orchestrator.
    pub engine_request_timeout: Duration,
}

impl Config {
    /// Resolve configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 8080),
            api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            engine_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            model_pro: env::var("MODEL_PRO").unwrap_or_else(|_| "gemini-2.5-pro".into()),
            model_flash: env::var("MODEL_FLASH")
                .unwrap_or_else(|_| "gemini-3-flash-preview".into()),
            single_shot_timeout: Duration::from_secs(env_parse(
                "SINGLE_SHOT_TIMEOUT_SECS",
                20,
            )),
            pipeline_timeout: Duration::from_secs(env_parse("PIPELINE_TIMEOUT_SECS", 45)),
            engine_request_timeout: Duration::from_secs(env_parse(
                "ENGINE_REQUEST_TIMEOUT_SECS",
                120,
            )),
        }
    }

    /// Path of the reference (standard contract) document.
    pub fn standard_contract_path(&self) -> PathBuf {
        self.data_dir.join("standard_contract.json")
    }

    /// Path of the pre-validated static fallback report.
    pub fn fallback_path(&self) -> PathBuf {
        self.data_dir.join("fallback_analysis.json")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
