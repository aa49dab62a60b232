//! Construction of verification requests from candidate texts.

use serde::{Deserialize, Serialize};

use crate::types::VerificationRequest;

/// Service-needs description used when the text is embedded in the document.
pub const SERVICE_CONTEXT: &str = "\
coach-ai 서비스는 다음과 같은 자료가 필요합니다:

1. 스트레칭 운동 관련 자료
- 신체 부위별 스트레칭 방법
- 증상/통증별 맞춤 스트레칭
- 스트레칭의 효과와 영향
- 올바른 스트레칭 자세와 기법
- 일상생활에서 활용 가능한 스트레칭

2. 통증 관리 관련 자료
- 근골격계 통증의 원인과 증상
- 통증 완화를 위한 운동 방법
- 자세 교정과 통증 관리
- 일상생활에서의 통증 예방
- 사무직 근로자를 위한 운동

3. 운동 효과 검증 자료
- 스트레칭의 효과성 연구
- 통증 개선 효과 연구
- 운동 방법의 안전성 검증
- 운동 효과의 과학적 근거
- 일반인 대상 연구 결과

4. 제외 대상
- 특수 의료장비 필요 연구
- 임상실험/수술 관련 연구
- 약물 치료 관련 연구";

/// Fixed assertion checked against the service context.
pub const SERVICE_CLAIM: &str =
    "이 자료는 코치ML 서비스에 필요한 스트레칭/통증 관리 관련 자료입니다.";

/// Description of where stretching shows up, used when the text is the claim.
pub const STRETCHING_CONTEXT: &str = "\
스트레칭은 다음과 같은 상황에서 사용됩니다:

1. 직접적인 스트레칭 운동
- 근육 신장 운동
- 유연성 향상 운동
- 관절 가동성 운동

2. 운동의 일부로서의 스트레칭
- 운동 전후 준비/정리
- 재활 운동의 일부
- 자세 교정 운동의 구성요소
- 필라테스나 요가의 동작 요소

3. 연구/실험에서의 스트레칭
- 스트레칭 효과 연구
- 근육/관절 관련 실험의 요소
- 운동 프로그램의 구성 요소
- 재활 프로토콜의 일부

4. 치료적 스트레칭
- 물리치료의 일환
- 재활 치료 과정
- 통증 관리 방법
- 자세 교정 요법";

/// How a candidate text becomes a `(document, claim)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RequestTemplate {
    /// Text appended to the context document, fixed claim.
    Templated { context: String, claim: String },
    /// Context document as-is, the text itself is the claim.
    TextAsClaim { context: String },
}

impl RequestTemplate {
    /// Template used by the dataset fact checker.
    pub fn service_check() -> Self {
        Self::Templated {
            context: SERVICE_CONTEXT.to_string(),
            claim: SERVICE_CLAIM.to_string(),
        }
    }

    /// Template used by the stretching classifier.
    pub fn stretching_claim() -> Self {
        Self::TextAsClaim {
            context: STRETCHING_CONTEXT.to_string(),
        }
    }

    /// Build a fresh request for `text`.
    pub fn build(&self, text: &str) -> VerificationRequest {
        match self {
            Self::Templated { context, claim } => VerificationRequest::new(
                format!("{}\n\n분석할 자료:\n{}", context, text),
                claim.clone(),
            ),
            Self::TextAsClaim { context } => VerificationRequest::new(context.clone(), text),
        }
    }
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self::service_check()
    }
}
