//! Three-tier degrade-gracefully fallback chain.
//!
//! Producers are tried in a fixed order — fast single-shot completion,
//! then the multi-stage pipeline, then the static pre-validated document —
//! each under its own wall-clock budget, one shot per producer. The first
//! candidate that survives parse → repair → validate is surfaced; the
//! static document guarantees the chain always terminates with a
//! conformant report. Callers can tell genuine analysis from the static
//! fallback only through the `analysisMode` provenance tag.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::Config;
use crate::engine::{Attachment, CompletionEngine, CompletionRequest};
use crate::pipeline::{lease_analysis_plan, run_pipeline, PipelineError, PipelinePlan};
use crate::reference::ReferenceStore;
use crate::report::{ensure_risk_amounts, parse_report_candidate, validate_report};

// ═══════════════════════════════════════════════════════════
// Provenance and attempt outcomes
// ═══════════════════════════════════════════════════════════

/// Provenance tag distinguishing genuine analysis from the static
/// fallback document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Real,
    Fallback,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Real => "real",
            AnalysisMode::Fallback => "fallback",
        }
    }
}

/// Outcome of one producer attempt. Internal to the orchestrator; the
/// caller only ever sees the accepted report plus the provenance tag.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Value),
    SchemaInvalid,
    Empty,
    TimedOut,
    RuntimeFailure(String),
}

impl AttemptOutcome {
    fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::SchemaInvalid => "schema_invalid",
            AttemptOutcome::Empty => "empty",
            AttemptOutcome::TimedOut => "timed_out",
            AttemptOutcome::RuntimeFailure(_) => "runtime_failure",
        }
    }
}

/// Judge a producer's raw text: parse, repair, validate.
fn accept_candidate(text: &str) -> AttemptOutcome {
    if text.trim().is_empty() {
        return AttemptOutcome::Empty;
    }
    let parsed = match parse_report_candidate(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Candidate rejected: unparsable");
            return AttemptOutcome::SchemaInvalid;
        }
    };
    let repaired = ensure_risk_amounts(parsed);
    if validate_report(&repaired) {
        AttemptOutcome::Success(repaired)
    } else {
        AttemptOutcome::SchemaInvalid
    }
}

/// Stamp the provenance tag onto an accepted report.
pub fn inject_analysis_mode(mut report: Value, mode: AnalysisMode) -> Value {
    if let Some(obj) = report.as_object_mut() {
        obj.insert("analysisMode".into(), Value::from(mode.as_str()));
    }
    report
}

// ═══════════════════════════════════════════════════════════
// Static fallback store
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum FallbackStoreError {
    #[error("cannot read fallback document at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("fallback document at {path} is not valid JSON: {detail}")]
    Malformed { path: String, detail: String },

    #[error("fallback document at {path} does not conform to the report schema")]
    SchemaInvalid { path: String },
}

/// The guaranteed-valid terminal producer: a static report loaded and
/// schema-checked once at startup, never validated against live input and
/// never rewritten at runtime.
pub struct FallbackStore {
    document: Value,
}

impl FallbackStore {
    pub fn load(path: &Path) -> Result<Self, FallbackStoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FallbackStoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document: Value =
            serde_json::from_str(&raw).map_err(|e| FallbackStoreError::Malformed {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        if !validate_report(&document) {
            return Err(FallbackStoreError::SchemaInvalid {
                path: path.display().to_string(),
            });
        }
        tracing::info!(path = %path.display(), "Fallback document loaded and validated");
        Ok(Self { document })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

// ═══════════════════════════════════════════════════════════
// Orchestrator
// ═══════════════════════════════════════════════════════════

/// Instruction for the fast single-shot producer: the whole analysis in
/// one engine call, with the reference document inlined.
fn build_single_shot_instruction(reference: &str) -> String {
    format!(
        r#"당신은 임대차 계약서 위험 분석 AI입니다.
첨부된 계약서를 분석하여 아래 JSON 형식으로만 결과를 출력하세요.

분석 과정:
1. 계약서의 모든 조항을 추출합니다.
2. 아래 국토교통부 표준 주택임대차계약서와 비교합니다.
3. 표준 대비 임차인에게 불리하게 변경된 조항을 찾습니다.
4. 각 위험 조항에 쉬운 한국어 3단계 설명과 행동 스크립트를 붙입니다.

## 표준 계약서 (비교 기준)
{reference}

## 출력 JSON 스키마
{{
  "summary": {{"totalMaxRisk": 위험금액합계(숫자), "riskLevel": "high/medium/low",
              "deviatedClauseCount": N, "totalClauseCount": N,
              "riskGrade": "위험/주의/안전", "headline": "이 계약서에서 잃을 수 있는 최대 금액"}},
  "clauses": [
    {{"number": "제N조", "title": "조항 제목", "deviationScore": 0-100, "riskAmount": 위험금액(숫자),
     "direction": "이탈 방향 1줄 요약", "original": "이 계약서 원문", "standard": "표준 계약서 원문",
     "easyKorean": {{"level1": "핵심 1-2문장", "level2": "일상 비유", "level3": "금액/상황 시나리오"}},
     "action": {{"type": "danger/negotiate", "priority": "urgent/high", "message": "행동 스크립트"}}}}
  ],
  "safeClausesSummary": [
    {{"number": "제N조", "title": "조항 제목", "deviationScore": 0-40, "status": "safe/caution"}}
  ],
  "overallAction": {{"type": "warning", "message": "전체 경고 메시지"}}
}}"#
    )
}

/// Runs the producer chain for one analysis request.
///
/// Shared read-only across requests; every call owns its own pipeline run
/// and state. Cancellation (attempt budgets) is observed here and nowhere
/// else.
pub struct FallbackOrchestrator {
    engine: Arc<dyn CompletionEngine>,
    reference: Arc<ReferenceStore>,
    fallback: Arc<FallbackStore>,
    plan: PipelinePlan,
    model_pro: String,
    model_flash: String,
    single_shot_timeout: Duration,
    pipeline_timeout: Duration,
}

impl FallbackOrchestrator {
    pub fn new(
        engine: Arc<dyn CompletionEngine>,
        reference: Arc<ReferenceStore>,
        fallback: Arc<FallbackStore>,
        config: &Config,
    ) -> Self {
        Self {
            engine,
            reference,
            fallback,
            plan: lease_analysis_plan(),
            model_pro: config.model_pro.clone(),
            model_flash: config.model_flash.clone(),
            single_shot_timeout: config.single_shot_timeout,
            pipeline_timeout: config.pipeline_timeout,
        }
    }

    /// Substitute the stage plan (used by tests and alternative products).
    pub fn with_plan(mut self, plan: PipelinePlan) -> Self {
        self.plan = plan;
        self
    }

    /// Run the chain to completion. Infallible by construction: the last
    /// producer is the pre-validated static document.
    pub async fn analyze(&self, attachment: Attachment) -> (Value, AnalysisMode) {
        match self.attempt_single_shot(&attachment).await {
            AttemptOutcome::Success(report) => {
                tracing::info!("Single-shot attempt accepted");
                return (report, AnalysisMode::Real);
            }
            outcome => {
                tracing::warn!(outcome = outcome.label(), "Single-shot attempt failed");
            }
        }

        match self.attempt_pipeline(&attachment).await {
            AttemptOutcome::Success(report) => {
                tracing::info!("Pipeline attempt accepted");
                return (report, AnalysisMode::Real);
            }
            outcome => {
                tracing::warn!(outcome = outcome.label(), "Pipeline attempt failed");
            }
        }

        tracing::info!("All producers failed; returning static fallback");
        (self.fallback.document().clone(), AnalysisMode::Fallback)
    }

    /// Attempt (a): one direct completion call with the full instruction
    /// inline. Shorter budget — the fast path.
    async fn attempt_single_shot(&self, attachment: &Attachment) -> AttemptOutcome {
        let instruction = build_single_shot_instruction(self.reference.get());
        let request = CompletionRequest::new(&self.model_pro, instruction)
            .with_attachment(attachment.clone())
            .with_temperature(0.3)
            .json();

        match timeout(self.single_shot_timeout, self.engine.complete(request)).await {
            Err(_) => AttemptOutcome::TimedOut,
            Ok(Err(e)) => AttemptOutcome::RuntimeFailure(e.to_string()),
            Ok(Ok(response)) => match response.text {
                Some(text) => accept_candidate(&text),
                None => AttemptOutcome::Empty,
            },
        }
    }

    /// Attempt (b): the multi-stage pipeline. Longer budget — strictly a
    /// quality upgrade tried only when the fast path fails.
    async fn attempt_pipeline(&self, attachment: &Attachment) -> AttemptOutcome {
        let run = run_pipeline(
            self.engine.as_ref(),
            &self.model_flash,
            &self.plan,
            self.reference.get(),
            attachment,
        );
        match timeout(self.pipeline_timeout, run).await {
            Err(_) => AttemptOutcome::TimedOut,
            Ok(Err(PipelineError::EmptyResult)) => AttemptOutcome::Empty,
            Ok(Err(e)) => AttemptOutcome::RuntimeFailure(e.to_string()),
            Ok(Ok(text)) => accept_candidate(&text),
        }
    }
}
