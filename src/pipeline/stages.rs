//! The lease analysis plan: which stages run, in which order, and the
//! instruction each one carries.
//!
//! Stage instructions are Korean because the product analyzes Korean
//! residential lease contracts and the report is consumed verbatim by the
//! front end. Templates reference earlier stage outputs with `{{key}}`
//! markers and the standard contract with `{{standard_contract}}`.

use super::stage::StageSpec;

/// Output key of the document parsing stage.
pub const KEY_PARSED_DOCUMENT: &str = "parsed_document";
/// Output key of the risk analysis stage.
pub const KEY_RISK_ANALYSIS: &str = "risk_analysis";
/// Output key of the report composition stage (terminal).
pub const KEY_FINAL_REPORT: &str = "final_report";
/// Output key of the augmentation stage (secondary).
pub const KEY_AUGMENTED_REPORT: &str = "augmented_report";

/// An ordered stage sequence plus which keys carry the candidate report.
#[derive(Debug, Clone, Copy)]
pub struct PipelinePlan {
    pub stages: &'static [StageSpec],
    /// Canonical candidate key, written by the terminal stage.
    pub terminal_key: &'static str,
    /// Richer superseding output; its optional sections are merged onto
    /// the terminal output, and it stands in when the terminal key is
    /// unset.
    pub secondary_key: Option<&'static str>,
}

const PARSER_INSTRUCTION: &str = r#"당신은 임대차 계약서 파싱 전문가입니다.
첨부된 계약서(PDF 또는 이미지)의 모든 조항을 추출하세요. 특약사항도 반드시 포함합니다.

아래 JSON 형식으로만 출력하세요:
{
  "title": "계약서 제목",
  "deposit_amount": 보증금(숫자, 명시되지 않으면 50000000),
  "monthly_rent": 월세(숫자, 명시되지 않으면 500000),
  "clauses": [
    {"number": "제N조", "title": "조항 제목", "body": "조항 전문 (원문 그대로)"}
  ]
}"#;

const ANALYZER_INSTRUCTION: &str = r#"당신은 임대차 계약서 위험 분석 전문가입니다.
파싱된 계약서를 국토교통부 표준 주택임대차계약서와 비교하여 임차인에게 불리하게
변경된 조항을 찾으세요.

## 표준 계약서 (비교 기준)
{{standard_contract}}

## 파싱된 계약서
{{parsed_document}}

## 위험 금액 계산 기준 (파싱된 보증금/월세 사용)
- 이탈도 90 이상: 보증금 × 20%
- 이탈도 80~89: 보증금 × 10%
- 이탈도 70~79: 보증금 × 15%
- 이탈도 60~69: 월세 × 12개월
- 이탈도 40~59: 월세 × 6개월
- 이탈도 0~39: 월세 × 3개월

## 판정 기준
- deviationScore 0-20 safe, 21-40 caution, 41-60 warning, 61-100 danger
- 임차인에게 불리한 변경만 위험으로 판정하고, deviationScore 41 이상만
  deviated_clauses에 포함하세요.

아래 JSON 형식으로만 출력하세요:
{
  "deviated_clauses": [
    {"number": "제N조", "title": "조항 제목", "deviationScore": 0-100,
     "riskAmount": 위험금액(숫자), "direction": "이탈 방향 1줄 요약",
     "original": "이 계약서의 조항 원문", "standard": "표준 계약서의 조항 원문"}
  ],
  "safe_clauses": [
    {"number": "제N조", "title": "조항 제목", "deviationScore": 0-40, "status": "safe 또는 caution"}
  ],
  "deposit_amount": 보증금,
  "monthly_rent": 월세
}"#;

const COMPOSER_INSTRUCTION: &str = r#"위험 분석 결과를 바탕으로 쉬운 한국어 변환 + 행동 스크립트 + 최종 보고서를 생성하세요.

## 쉬운 한국어 변환 원칙
1. 복합문은 단문으로, 수동태는 능동태로 바꿉니다.
2. 한자어는 일상어로 바꿉니다 (임차인→세입자, 임대인→집주인, 해지→계약 끝내기,
   위약금→벌금, 원상회복→처음 상태로 고치기).
3. 모든 문장에 주어를 명시하고, 기한은 문장 맨 앞에 둡니다.

## 행동 유형
- deviationScore > 60 → type "danger", priority "urgent"
- deviationScore <= 60 → type "negotiate", priority "high"

## 입력
위험 분석: {{risk_analysis}}
파싱 원본: {{parsed_document}}

아래 JSON 형식으로만 출력하세요:
{
  "summary": {"totalMaxRisk": 위험금액합계, "riskLevel": "high/medium/low",
              "deviatedClauseCount": N, "totalClauseCount": N,
              "riskGrade": "위험/주의/안전", "headline": "이 계약서에서 잃을 수 있는 최대 금액"},
  "clauses": [
    {"number": "제N조", "title": "제목", "deviationScore": N, "riskAmount": N,
     "direction": "이탈 요약", "original": "원문", "standard": "표준 원문",
     "easyKorean": {"level1": "핵심 1-2문장", "level2": "일상 비유", "level3": "금액/상황 시나리오"},
     "action": {"type": "danger/negotiate", "priority": "urgent/high", "message": "행동 스크립트 (존댓말)"}}
  ],
  "safeClausesSummary": [
    {"number": "제N조", "title": "제목", "deviationScore": N, "status": "safe/caution"}
  ],
  "overallAction": {"type": "warning", "message": "위험 조항 수 + 최대 손실 + 체크리스트"}
}"#;

const AUGMENTER_INSTRUCTION: &str = r#"아래 최종 보고서를 검수하고 이해도 확인 문제를 덧붙이세요.

## 최종 보고서
{{final_report}}

## 위험 분석
{{risk_analysis}}

보고서 본문(summary, clauses, overallAction)은 그대로 유지하고,
누락되었다면 safeClausesSummary를 보완하며, comprehension 블록을 추가한
전체 보고서 JSON만 출력하세요:
{
  ...보고서 본문 그대로...,
  "safeClausesSummary": [...],
  "comprehension": {
    "clozeQuestions": [
      {"clauseNumber": "제N조", "question": "빈칸 문제 ___", "answer": "정답"}
    ],
    "scenarioQuestions": [
      {"scenario": "상황 설명", "question": "질문", "choices": ["보기1", "보기2", "보기3"]}
    ]
  }
}"#;

/// Stages of the lease analysis pipeline, in execution order.
const LEASE_STAGES: &[StageSpec] = &[
    StageSpec {
        name: "document_parser",
        instruction: PARSER_INSTRUCTION,
        input_keys: &[],
        output_key: KEY_PARSED_DOCUMENT,
        attach_document: true,
        temperature: 0.1,
        tools: &[],
    },
    StageSpec {
        name: "risk_analyzer",
        instruction: ANALYZER_INSTRUCTION,
        input_keys: &[KEY_PARSED_DOCUMENT],
        output_key: KEY_RISK_ANALYSIS,
        attach_document: false,
        temperature: 0.2,
        tools: &[],
    },
    StageSpec {
        name: "report_composer",
        instruction: COMPOSER_INSTRUCTION,
        input_keys: &[KEY_RISK_ANALYSIS, KEY_PARSED_DOCUMENT],
        output_key: KEY_FINAL_REPORT,
        attach_document: false,
        temperature: 0.4,
        tools: &[],
    },
    StageSpec {
        name: "report_augmenter",
        instruction: AUGMENTER_INSTRUCTION,
        input_keys: &[KEY_FINAL_REPORT, KEY_RISK_ANALYSIS],
        output_key: KEY_AUGMENTED_REPORT,
        attach_document: false,
        temperature: 0.4,
        tools: &[],
    },
];

/// The production lease analysis plan.
pub fn lease_analysis_plan() -> PipelinePlan {
    PipelinePlan {
        stages: LEASE_STAGES,
        terminal_key: KEY_FINAL_REPORT,
        secondary_key: Some(KEY_AUGMENTED_REPORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_orders_stages_parser_first() {
        let plan = lease_analysis_plan();
        assert_eq!(plan.stages.len(), 4);
        assert_eq!(plan.stages[0].name, "document_parser");
        assert!(plan.stages[0].attach_document);
        assert_eq!(plan.terminal_key, KEY_FINAL_REPORT);
        assert_eq!(plan.secondary_key, Some(KEY_AUGMENTED_REPORT));
    }

    #[test]
    fn only_first_stage_consumes_the_attachment() {
        let plan = lease_analysis_plan();
        assert!(plan.stages.iter().skip(1).all(|s| !s.attach_document));
    }

    #[test]
    fn stages_read_only_earlier_keys() {
        // Forward references are impossible by construction: every input
        // key must be the output key of a strictly earlier stage.
        let plan = lease_analysis_plan();
        let mut written: Vec<&str> = Vec::new();
        for stage in plan.stages {
            for key in stage.input_keys {
                assert!(
                    written.contains(key),
                    "stage '{}' reads '{}' before it is written",
                    stage.name,
                    key
                );
            }
            written.push(stage.output_key);
        }
    }

    #[test]
    fn templates_carry_their_input_markers() {
        let plan = lease_analysis_plan();
        for stage in plan.stages {
            for key in stage.input_keys {
                assert!(
                    stage.instruction.contains(&format!("{{{{{key}}}}}")),
                    "stage '{}' misses marker for '{}'",
                    stage.name,
                    key
                );
            }
        }
    }

    #[test]
    fn analyzer_embeds_the_reference_marker() {
        assert!(ANALYZER_INSTRUCTION.contains(super::super::stage::REFERENCE_MARKER));
    }
}
