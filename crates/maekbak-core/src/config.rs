//! 파이프라인 설정 구조체.
//!
//! 틱 주기, 카운터 리셋 정책, component 태그 값 등 런타임 설정을 정의한다.
//! JSON 파일 로드/저장은 `config_manager` 참조.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::MetricError;
use crate::models::metric::ResetPolicy;

/// 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 틱 주기 (ms) — 스냅샷 생성/디스패치 간격
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// 카운터 리셋 정책 (레지스트리 기본값, 계측기별 오버라이드 가능)
    #[serde(default)]
    pub counter_reset: ResetPolicy,
    /// 모든 태그 집합에 주입되는 component 태그 값
    #[serde(default = "default_component")]
    pub component: String,
}

fn default_tick_interval_ms() -> u64 {
    5_000
}

fn default_component() -> String {
    "system-metrics".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl PipelineConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            counter_reset: ResetPolicy::default(),
            component: default_component(),
        }
    }

    /// 틱 주기를 `Duration`으로 반환
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), MetricError> {
        if self.tick_interval_ms == 0 {
            return Err(MetricError::Config(
                "tick_interval_ms는 0일 수 없음".to_string(),
            ));
        }
        if self.component.is_empty() {
            return Err(MetricError::Config(
                "component 태그 값이 비어 있음".to_string(),
            ));
        }
        Ok(())
    }
}
