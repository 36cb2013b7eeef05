//! 수집 드라이버 포트.
//!
//! OS/런타임 카운터를 읽어 계측기에 기록하는 주기 작업 인터페이스.
//! 드라이버는 생성 시점에 레지스트리에서 계측기 핸들을 정제해 보관하고,
//! `collect` 호출마다 값을 기록한다. 값을 어떻게 얻는지(syscall, proc
//! 파일시스템 등)는 코어가 알지 못한다.

use async_trait::async_trait;

use crate::error::MetricError;

/// 주기 수집 드라이버
#[async_trait]
pub trait CollectorDriver: Send + Sync {
    /// 드라이버 식별자 (로그용)
    fn name(&self) -> &str;

    /// 한 번의 수집 수행 — 보유한 계측기 핸들에 값 기록
    async fn collect(&self) -> Result<(), MetricError>;
}
