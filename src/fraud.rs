//! Lease fraud lookup — search-grounded neighborhood check.
//!
//! A separate single-shot producer, not part of the fallback chain. The
//! lookup never fails the request: on any internal error it substitutes a
//! "could not search" placeholder carrying the same fixed list of manual
//! verification links.

use std::sync::Arc;

use serde::Serialize;

use crate::engine::{CompletionEngine, CompletionRequest, EngineTool, WebSource};

/// A registry/authority the tenant can check by hand.
#[derive(Debug, Clone, Serialize)]
pub struct ManualLink {
    pub name: &'static str,
    pub url: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
}

/// Fixed manual-verification links, returned with every response.
pub fn manual_check_links() -> Vec<ManualLink> {
    vec![
        ManualLink {
            name: "인터넷등기소",
            url: "https://www.iros.go.kr",
            phone: None,
        },
        ManualLink {
            name: "실거래가 공개시스템",
            url: "https://rt.molit.go.kr",
            phone: None,
        },
        ManualLink {
            name: "HUG 전세보증금보증",
            url: "https://www.khug.or.kr",
            phone: None,
        },
        ManualLink {
            name: "대한법률구조공단",
            url: "https://www.klac.or.kr",
            phone: Some("132"),
        },
    ]
}

/// Best-effort lookup result. `search_performed` is false when the
/// placeholder was substituted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCheckResult {
    pub search_performed: bool,
    pub address: String,
    pub summary: String,
    pub sources: Vec<WebSource>,
    pub manual_check_links: Vec<ManualLink>,
}

fn build_instruction(address: &str) -> String {
    format!(
        r#"다음 주소 주변의 전세사기, 보증금 미반환, 임대차 분쟁 관련 최신 뉴스와 정보를 검색하세요.

주소: {address}

검색할 내용:
1. 해당 지역 전세사기 피해 사례
2. 보증금 미반환 사건
3. 임대인 관련 분쟁 이력
4. 해당 지역 부동산 사기 주의보

검색 결과를 바탕으로 해당 지역의 전세 거래 안전도를 평가하고, 주의해야 할 사항을 알려주세요."#
    )
}

/// Search-grounded fraud lookup over the completion engine.
pub struct FraudCheck {
    engine: Arc<dyn CompletionEngine>,
    model: String,
}

impl FraudCheck {
    pub fn new(engine: Arc<dyn CompletionEngine>, model: &str) -> Self {
        Self {
            engine,
            model: model.to_string(),
        }
    }

    /// Look up an address. Internal failures degrade to the placeholder.
    pub async fn search(&self, address: &str) -> FraudCheckResult {
        let request = CompletionRequest::new(&self.model, build_instruction(address))
            .with_temperature(0.2)
            .with_tools(&[EngineTool::GoogleSearch]);

        match self.engine.complete(request).await {
            Ok(response) => match response.text {
                Some(summary) => FraudCheckResult {
                    search_performed: true,
                    address: address.to_string(),
                    summary,
                    sources: response.sources,
                    manual_check_links: manual_check_links(),
                },
                None => {
                    tracing::warn!(address, "Fraud lookup returned no text");
                    placeholder(address)
                }
            },
            Err(e) => {
                tracing::error!(error = %e, address, "Fraud lookup failed");
                placeholder(address)
            }
        }
    }
}

fn placeholder(address: &str) -> FraudCheckResult {
    FraudCheckResult {
        search_performed: false,
        address: address.to_string(),
        summary: "검색을 수행할 수 없습니다. 아래 링크에서 직접 확인해주세요.".to_string(),
        sources: Vec::new(),
        manual_check_links: manual_check_links(),
    }
}
