//! Structural schema check on report candidates.
//!
//! Validity is binary and total: the first missing required field rejects
//! the candidate. Optional sections are validated only when present. The
//! validator checks shape, not values — numeric sanity is the repairer's
//! job and runs before validation.

use serde_json::Value;

/// Required fields of `summary`.
const SUMMARY_FIELDS: &[&str] = &[
    "totalMaxRisk",
    "riskLevel",
    "deviatedClauseCount",
    "totalClauseCount",
];

/// Required scalar fields of every clause record.
const CLAUSE_FIELDS: &[&str] = &[
    "number",
    "title",
    "deviationScore",
    "riskAmount",
    "original",
    "standard",
];

/// Required fields of the three-tier plain-language explanation.
const EASY_KOREAN_FIELDS: &[&str] = &["level1", "level2", "level3"];

/// Required fields of a clause action record.
const ACTION_FIELDS: &[&str] = &["type", "priority", "message"];

/// Structural validation of a report candidate.
pub fn validate_report(candidate: &Value) -> bool {
    let Some(root) = candidate.as_object() else {
        return false;
    };

    let Some(summary) = root.get("summary").and_then(Value::as_object) else {
        return false;
    };
    if !has_all(summary, SUMMARY_FIELDS) {
        return false;
    }

    let Some(clauses) = root.get("clauses").and_then(Value::as_array) else {
        return false;
    };
    if !clauses.iter().all(clause_is_valid) {
        return false;
    }

    if !root.contains_key("overallAction") {
        return false;
    }

    match root.get("comprehension") {
        Some(comprehension) => validate_comprehension(comprehension),
        None => true,
    }
}

/// Validate a comprehension block (embedded in a report or produced
/// standalone by the comprehension generator).
pub fn validate_comprehension(block: &Value) -> bool {
    let Some(obj) = block.as_object() else {
        return false;
    };

    if let Some(cloze) = obj.get("clozeQuestions") {
        let Some(entries) = cloze.as_array() else {
            return false;
        };
        if !entries
            .iter()
            .all(|e| entry_has_all(e, &["clauseNumber", "question", "answer"]))
        {
            return false;
        }
    }

    if let Some(scenarios) = obj.get("scenarioQuestions") {
        let Some(entries) = scenarios.as_array() else {
            return false;
        };
        if !entries
            .iter()
            .all(|e| entry_has_all(e, &["scenario", "question", "choices"]))
        {
            return false;
        }
    }

    true
}

fn clause_is_valid(clause: &Value) -> bool {
    let Some(obj) = clause.as_object() else {
        return false;
    };
    if !has_all(obj, CLAUSE_FIELDS) {
        return false;
    }

    let Some(easy) = obj.get("easyKorean").and_then(Value::as_object) else {
        return false;
    };
    if !has_all(easy, EASY_KOREAN_FIELDS) {
        return false;
    }

    let Some(action) = obj.get("action").and_then(Value::as_object) else {
        return false;
    };
    has_all(action, ACTION_FIELDS)
}

fn has_all(obj: &serde_json::Map<String, Value>, fields: &[&str]) -> bool {
    fields.iter().all(|f| obj.contains_key(*f))
}

fn entry_has_all(entry: &Value, fields: &[&str]) -> bool {
    entry
        .as_object()
        .is_some_and(|obj| has_all(obj, fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_report() -> Value {
        json!({
            "summary": {
                "totalMaxRisk": 0,
                "riskLevel": "low",
                "deviatedClauseCount": 0,
                "totalClauseCount": 0
            },
            "clauses": [],
            "overallAction": {"type": "warning", "message": "확인하세요"}
        })
    }

    fn full_clause() -> Value {
        json!({
            "number": "제4조",
            "title": "보증금 반환",
            "deviationScore": 85,
            "riskAmount": 10000000,
            "original": "보증금은 6개월 이내 반환한다.",
            "standard": "보증금은 1개월 이내 반환한다.",
            "easyKorean": {
                "level1": "집주인이 보증금을 늦게 돌려줄 수 있습니다.",
                "level2": "은행이 예금을 6개월 묶어두는 것과 같습니다.",
                "level3": "이사 후 6개월간 5천만 원을 못 받을 수 있습니다."
            },
            "action": {"type": "danger", "priority": "urgent", "message": "수정을 요청하세요."}
        })
    }

    #[test]
    fn minimal_report_with_zero_clauses_is_valid() {
        assert!(validate_report(&minimal_report()));
    }

    #[test]
    fn report_with_full_clause_is_valid() {
        let mut report = minimal_report();
        report["clauses"] = json!([full_clause()]);
        assert!(validate_report(&report));
    }

    #[test]
    fn missing_top_level_sections_reject() {
        for section in ["summary", "clauses", "overallAction"] {
            let mut report = minimal_report();
            report.as_object_mut().unwrap().remove(section);
            assert!(!validate_report(&report), "missing {section} must reject");
        }
    }

    #[test]
    fn missing_summary_field_rejects() {
        for field in SUMMARY_FIELDS {
            let mut report = minimal_report();
            report["summary"].as_object_mut().unwrap().remove(*field);
            assert!(!validate_report(&report), "missing summary.{field} must reject");
        }
    }

    #[test]
    fn missing_any_clause_field_rejects() {
        for field in CLAUSE_FIELDS.iter().chain(&["easyKorean", "action"]) {
            let mut clause = full_clause();
            clause.as_object_mut().unwrap().remove(*field);
            let mut report = minimal_report();
            report["clauses"] = json!([clause]);
            assert!(!validate_report(&report), "missing clause.{field} must reject");
        }
    }

    #[test]
    fn missing_nested_easy_korean_level_rejects() {
        let mut clause = full_clause();
        clause["easyKorean"].as_object_mut().unwrap().remove("level2");
        let mut report = minimal_report();
        report["clauses"] = json!([clause]);
        assert!(!validate_report(&report));
    }

    #[test]
    fn missing_nested_action_field_rejects() {
        let mut clause = full_clause();
        clause["action"].as_object_mut().unwrap().remove("priority");
        let mut report = minimal_report();
        report["clauses"] = json!([clause]);
        assert!(!validate_report(&report));
    }

    #[test]
    fn one_bad_clause_among_good_rejects() {
        let mut report = minimal_report();
        report["clauses"] = json!([full_clause(), {"number": "제5조"}]);
        assert!(!validate_report(&report));
    }

    #[test]
    fn non_object_candidate_rejects() {
        assert!(!validate_report(&json!([])));
        assert!(!validate_report(&json!("report")));
    }

    #[test]
    fn optional_safe_clauses_summary_is_not_checked() {
        let mut report = minimal_report();
        report["safeClausesSummary"] = json!([{"number": "제1조"}]);
        assert!(validate_report(&report));
    }

    #[test]
    fn valid_comprehension_block_accepts() {
        let block = json!({
            "clozeQuestions": [
                {"clauseNumber": "제4조", "question": "보증금은 언제 돌려받나요? ___", "answer": "1개월 이내"}
            ],
            "scenarioQuestions": [
                {"scenario": "계약이 끝났는데", "question": "어떻게 하나요?", "choices": ["기다린다", "내용증명을 보낸다"]}
            ]
        });
        assert!(validate_comprehension(&block));

        let mut report = minimal_report();
        report["comprehension"] = block;
        assert!(validate_report(&report));
    }

    #[test]
    fn comprehension_with_bad_cloze_entry_rejects() {
        let mut report = minimal_report();
        report["comprehension"] = json!({
            "clozeQuestions": [{"question": "answer 없음"}]
        });
        assert!(!validate_report(&report));
    }

    #[test]
    fn comprehension_with_bad_scenario_entry_rejects() {
        let block = json!({
            "scenarioQuestions": [{"scenario": "시나리오만 있음"}]
        });
        assert!(!validate_comprehension(&block));
    }

    #[test]
    fn empty_comprehension_object_accepts() {
        // Both question lists are optional inside the block.
        assert!(validate_comprehension(&json!({})));
    }
}
