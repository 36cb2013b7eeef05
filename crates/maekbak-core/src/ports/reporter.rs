//! 리포터 포트.
//!
//! 스냅샷 소비자 인터페이스. 구현: `maekbak-reporters` crate.
//! 디스패처는 등록 순서대로 순차 호출하며, 비동기 I/O가 필요한
//! 리포터는 내부에서 핸드오프해야 한다 (디스패처는 동시성을 제공하지 않음).

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::MetricError;
use crate::models::snapshot::PeriodSnapshot;

/// 주기 스냅샷 소비자
///
/// 스냅샷에 대한 소유권은 갖지 않는다. 전달받은 `Arc<PeriodSnapshot>`은
/// 모든 리포터가 공유하는 동일한 불변 레코드다.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// 리포터 식별자 (디스패처 등록/해제 키)
    fn name(&self) -> &str;

    /// 리포터 시작 (`add_reporter` 시점에 호출)
    async fn start(&self) -> Result<(), MetricError>;

    /// 리포터 종료 (`remove_reporter` 시점에 호출)
    async fn stop(&self) -> Result<(), MetricError>;

    /// 설정 변경 통지 (다음 틱 이전에 브로드캐스트됨)
    async fn reconfigure(&self, config: &PipelineConfig) -> Result<(), MetricError>;

    /// 주기 스냅샷 전달
    ///
    /// 에러를 반환해도 디스패치 경계에서 격리되어 다른 리포터와
    /// 스케줄러에는 전파되지 않는다.
    async fn report_period_snapshot(
        &self,
        snapshot: Arc<PeriodSnapshot>,
    ) -> Result<(), MetricError>;
}
