//! 프로세스 전역 레지스트리 핸들.
//!
//! 편의용 얇은 래퍼. 명시적으로 생성한 레지스트리 인스턴스 하나를
//! `install`로 등록해야 하며, 등록 전 `instance` 호출은 에러다.
//! 암묵적 기본 레지스트리는 만들지 않는다.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

use maekbak_core::error::MetricError;

use crate::registry::MetricRegistry;

static GLOBAL: OnceCell<Arc<MetricRegistry>> = OnceCell::new();

/// 전역 레지스트리 설치 (프로세스당 1회)
///
/// 이미 설치되어 있으면 `Config` 에러.
pub fn install(registry: Arc<MetricRegistry>) -> Result<(), MetricError> {
    let component = registry.component().to_string();
    GLOBAL
        .set(registry)
        .map_err(|_| MetricError::Config("전역 레지스트리가 이미 설치됨".to_string()))?;
    info!("전역 레지스트리 설치: component={component}");
    Ok(())
}

/// 전역 레지스트리 조회
///
/// `install` 이전 호출은 `Config` 에러 — 조용히 기본값을 만들지 않는다.
pub fn instance() -> Result<Arc<MetricRegistry>, MetricError> {
    GLOBAL
        .get()
        .cloned()
        .ok_or_else(|| MetricError::Config("전역 레지스트리가 설치되지 않음".to_string()))
}

/// 설치 여부 확인
pub fn is_installed() -> bool {
    GLOBAL.get().is_some()
}
