//! 로그 리포터.
//!
//! 스냅샷 요약을 tracing으로 출력한다. 외부 전송 없음.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use maekbak_core::config::PipelineConfig;
use maekbak_core::error::MetricError;
use maekbak_core::models::snapshot::PeriodSnapshot;
use maekbak_core::ports::reporter::Reporter;

/// 로그 리포터 — 스냅샷을 구조화 로그로 기록
pub struct LogReporter {
    name: String,
}

impl LogReporter {
    /// 새 로그 리포터 생성 (이름: "log")
    pub fn new() -> Self {
        Self {
            name: "log".to_string(),
        }
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reporter for LogReporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), MetricError> {
        info!("로그 리포터 시작");
        Ok(())
    }

    async fn stop(&self) -> Result<(), MetricError> {
        info!("로그 리포터 종료");
        Ok(())
    }

    async fn reconfigure(&self, config: &PipelineConfig) -> Result<(), MetricError> {
        debug!("로그 리포터 설정 변경: 틱 주기 {}ms", config.tick_interval_ms);
        Ok(())
    }

    async fn report_period_snapshot(
        &self,
        snapshot: Arc<PeriodSnapshot>,
    ) -> Result<(), MetricError> {
        info!(
            "주기 스냅샷 [{} ~ {}]: 시리즈 {}개, 포인트 {}개",
            snapshot.from,
            snapshot.to,
            snapshot.series.len(),
            snapshot.point_count()
        );
        for series in &snapshot.series {
            for point in &series.points {
                debug!(
                    "{} ({}) {} = {:?}",
                    series.name, series.kind, point.tags, point.value
                );
            }
        }
        Ok(())
    }
}
