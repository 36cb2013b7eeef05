//! MAEKBAK 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 `MetricError`를 그대로 반환한다.
//! 리포터 디스패치 경계에서 발생하는 에러는 전파하지 않고 로그로만 남긴다.

use thiserror::Error;

use crate::models::metric::MetricKind;

/// 파이프라인 공통 에러.
/// 계측기 등록, 스냅샷 조회, 리포터 수명주기에서 발생하는 에러를 정의한다.
#[derive(Debug, Error)]
pub enum MetricError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 같은 메트릭 이름을 다른 계측기 종류로 재등록
    #[error("계측기 종류 충돌 — {name}: 기존 {existing}, 요청 {requested}")]
    KindConflict {
        /// 충돌한 메트릭 이름
        name: String,
        /// 이미 등록된 종류
        existing: MetricKind,
        /// 새로 요청된 종류
        requested: MetricKind,
    },

    /// 첫 틱 이전에 스냅샷 조회
    #[error("아직 생성된 스냅샷 없음")]
    NoSnapshot,

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Reporter")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 리포터 내부 에러 (디스패치 경계에서 격리됨)
    #[error("리포터 에러: {0}")]
    Report(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_conflict_message_names_both_kinds() {
        let err = MetricError::KindConflict {
            name: "host.cpu".to_string(),
            existing: MetricKind::Counter,
            requested: MetricKind::Gauge,
        };
        let msg = err.to_string();
        assert!(msg.contains("host.cpu"));
        assert!(msg.contains("counter"));
        assert!(msg.contains("gauge"));
    }

    #[test]
    fn not_found_message() {
        let err = MetricError::NotFound {
            resource_type: "Reporter".to_string(),
            id: "log".to_string(),
        };
        assert_eq!(err.to_string(), "Reporter 미발견: log");
    }
}
