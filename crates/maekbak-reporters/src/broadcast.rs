//! 브로드캐스트 리포터.
//!
//! 스냅샷을 `tokio::sync::broadcast` 채널로 팬아웃한다.
//! 구독자(웹 대시보드, 실시간 뷰 등)가 없거나 느려도 디스패치를
//! 막지 않는다 — 디스패처에 필요한 비동기 핸드오프를 채널이 담당.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use maekbak_core::config::PipelineConfig;
use maekbak_core::error::MetricError;
use maekbak_core::models::snapshot::PeriodSnapshot;
use maekbak_core::ports::reporter::Reporter;

/// 브로드캐스트 리포터 — 실시간 스냅샷 채널
pub struct BroadcastReporter {
    name: String,
    tx: broadcast::Sender<Arc<PeriodSnapshot>>,
}

impl BroadcastReporter {
    /// 새 브로드캐스트 리포터 생성
    ///
    /// `capacity`는 구독자별 지연 허용 버퍼 크기. 버퍼가 넘치면
    /// 느린 구독자 쪽에서 오래된 스냅샷부터 유실된다 (디스패치는 무손실).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            name: "broadcast".to_string(),
            tx,
        }
    }

    /// 스냅샷 수신 채널 구독
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PeriodSnapshot>> {
        self.tx.subscribe()
    }

    /// 현재 구독자 수
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl Reporter for BroadcastReporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), MetricError> {
        info!("브로드캐스트 리포터 시작");
        Ok(())
    }

    async fn stop(&self) -> Result<(), MetricError> {
        info!("브로드캐스트 리포터 종료");
        Ok(())
    }

    async fn reconfigure(&self, _config: &PipelineConfig) -> Result<(), MetricError> {
        Ok(())
    }

    async fn report_period_snapshot(
        &self,
        snapshot: Arc<PeriodSnapshot>,
    ) -> Result<(), MetricError> {
        // 구독자가 없으면 send가 실패하지만 에러가 아님
        if self.tx.send(snapshot).is_err() {
            debug!("브로드캐스트 구독자 없음, 스냅샷 폐기");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maekbak_core::models::snapshot::PeriodSnapshot;

    fn empty_snapshot() -> Arc<PeriodSnapshot> {
        Arc::new(PeriodSnapshot {
            from: chrono::Utc::now(),
            to: chrono::Utc::now(),
            series: vec![],
        })
    }

    #[tokio::test]
    async fn subscriber_receives_snapshot() {
        let reporter = BroadcastReporter::new(16);
        let mut rx = reporter.subscribe();

        let snapshot = empty_snapshot();
        reporter
            .report_period_snapshot(Arc::clone(&snapshot))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        // 동일한 불변 스냅샷을 공유
        assert!(Arc::ptr_eq(&snapshot, &received));
    }

    #[tokio::test]
    async fn report_without_subscribers_is_not_an_error() {
        let reporter = BroadcastReporter::new(16);
        assert_eq!(reporter.subscriber_count(), 0);
        reporter
            .report_period_snapshot(empty_snapshot())
            .await
            .unwrap();
    }
}
