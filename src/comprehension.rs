//! Comprehension question generator.
//!
//! A standalone single-shot producer invoked after the main report has
//! already been delivered. Explicitly supplementary: there is no fallback
//! chain here, and a failure is reported to the caller as a distinct
//! generation error instead of silently degrading.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::engine::{CompletionEngine, CompletionRequest, EngineError};
use crate::report::{parse_report_candidate, validate_comprehension, ReportError};

#[derive(Error, Debug)]
pub enum ComprehensionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("engine produced no comprehension text")]
    EmptyResponse,

    #[error(transparent)]
    Malformed(#[from] ReportError),

    #[error("comprehension block failed schema validation")]
    SchemaInvalid,
}

fn build_instruction(risk_analysis: &Value, final_report: &Value) -> String {
    format!(
        r#"아래 위험 분석과 최종 보고서를 읽고, 세입자가 계약서를 제대로 이해했는지
확인하는 문제를 만드세요.

## 위험 분석
{risk_analysis}

## 최종 보고서
{final_report}

아래 JSON 형식으로만 출력하세요:
{{
  "clozeQuestions": [
    {{"clauseNumber": "제N조", "question": "핵심 내용 빈칸 문제 ___", "answer": "정답"}}
  ],
  "scenarioQuestions": [
    {{"scenario": "실제 일어날 수 있는 상황", "question": "어떻게 해야 하나요?", "choices": ["보기1", "보기2", "보기3"]}}
  ]
}}

조항당 빈칸 문제 1개, 위험 조항당 시나리오 문제 1개를 만드세요. 쉬운 한국어만 사용하세요."#
    )
}

/// Generates a comprehension block from prior analysis outputs.
pub struct ComprehensionGenerator {
    engine: Arc<dyn CompletionEngine>,
    model: String,
}

impl ComprehensionGenerator {
    pub fn new(engine: Arc<dyn CompletionEngine>, model: &str) -> Self {
        Self {
            engine,
            model: model.to_string(),
        }
    }

    /// One engine call: prompt → parse → validate. Any failure surfaces.
    pub async fn generate(
        &self,
        risk_analysis: &Value,
        final_report: &Value,
    ) -> Result<Value, ComprehensionError> {
        let instruction = build_instruction(risk_analysis, final_report);
        let request = CompletionRequest::new(&self.model, instruction)
            .with_temperature(0.4)
            .json();

        let response = self.engine.complete(request).await?;
        let text = response.text.ok_or(ComprehensionError::EmptyResponse)?;

        let block = parse_report_candidate(&text)?;
        if !validate_comprehension(&block) {
            return Err(ComprehensionError::SchemaInvalid);
        }
        Ok(block)
    }
}
