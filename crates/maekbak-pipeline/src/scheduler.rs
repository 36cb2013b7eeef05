//! 스냅샷 스케줄러.
//!
//! 단일 백그라운드 태스크가 틱 주기마다 레지스트리를 드레인해
//! `PeriodSnapshot`을 만들고 디스패처에 넘긴다.
//! 상태 기계: Stopped → Running → Stopped.

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use maekbak_core::config::PipelineConfig;
use maekbak_core::error::MetricError;
use maekbak_core::models::snapshot::PeriodSnapshot;
use maekbak_registry::MetricRegistry;

use crate::dispatcher::ReporterDispatcher;

/// 실행 중인 틱 태스크 상태
#[derive(Default)]
struct TickTask {
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

/// 스냅샷 스케줄러
///
/// `start`/`stop`은 멱등이다. `stop`은 진행 중인 틱과 디스패치가
/// 끝난 뒤에 반환하므로, 반환 이후 리포터 호출은 더 이상 없다.
pub struct SnapshotScheduler {
    registry: Arc<MetricRegistry>,
    dispatcher: Arc<ReporterDispatcher>,
    /// 틱 주기 변경 채널 — 루프가 다음 틱 경계부터 반영
    interval_tx: watch::Sender<Duration>,
    task: Mutex<TickTask>,
    last_snapshot: Arc<RwLock<Option<Arc<PeriodSnapshot>>>>,
}

impl SnapshotScheduler {
    /// 새 스케줄러 생성 (Stopped 상태)
    pub fn new(
        registry: Arc<MetricRegistry>,
        dispatcher: Arc<ReporterDispatcher>,
        config: &PipelineConfig,
    ) -> Result<Self, MetricError> {
        config.validate()?;
        let (interval_tx, _) = watch::channel(config.tick_interval());
        Ok(Self {
            registry,
            dispatcher,
            interval_tx,
            task: Mutex::new(TickTask::default()),
            last_snapshot: Arc::new(RwLock::new(None)),
        })
    }

    /// 틱 루프 시작 (Stopped → Running)
    ///
    /// 이미 실행 중이면 경고 로그 후 no-op — 틱 태스크가 이중으로
    /// 등록되는 일은 없다.
    pub async fn start(&self) -> Result<(), MetricError> {
        let mut task = self.task.lock().await;
        if task.handle.is_some() {
            warn!("스케줄러가 이미 실행 중 — start 무시");
            return Ok(());
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let mut interval_rx = self.interval_tx.subscribe();
        let registry = Arc::clone(&self.registry);
        let dispatcher = Arc::clone(&self.dispatcher);
        let last_snapshot = Arc::clone(&self.last_snapshot);

        let handle = tokio::spawn(async move {
            let mut tick = *interval_rx.borrow();
            info!("스케줄러 시작: 틱 주기 {}ms", tick.as_millis());

            // 첫 틱은 한 주기 뒤 — 즉시 틱이 생기면 폭이 0인 주기가 됨
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
            let mut period_start = Utc::now();

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let now = Utc::now();
                        let snapshot = Arc::new(registry.drain_snapshot(period_start, now));
                        period_start = now;
                        *last_snapshot.write() = Some(Arc::clone(&snapshot));
                        dispatcher.dispatch(snapshot).await;
                    }
                    changed = interval_rx.changed() => {
                        if changed.is_err() {
                            // 스케줄러가 드롭됨
                            break;
                        }
                        tick = *interval_rx.borrow();
                        info!("틱 주기 변경: {}ms (다음 틱부터 적용)", tick.as_millis());
                        interval = tokio::time::interval_at(
                            tokio::time::Instant::now() + tick,
                            tick,
                        );
                    }
                    _ = shutdown_rx.changed() => {
                        info!("스냅샷 루프 종료");
                        break;
                    }
                }
            }
        });

        task.shutdown_tx = Some(shutdown_tx);
        task.handle = Some(handle);
        Ok(())
    }

    /// 틱 루프 종료 (Running → Stopped)
    ///
    /// 진행 중인 틱/디스패치가 완료될 때까지 대기한 뒤 반환한다.
    /// 실행 중이 아니면 no-op.
    pub async fn stop(&self) -> Result<(), MetricError> {
        let mut task = self.task.lock().await;
        let Some(handle) = task.handle.take() else {
            debug!("스케줄러가 실행 중이 아님 — stop 무시");
            return Ok(());
        };

        if let Some(shutdown_tx) = task.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
        handle
            .await
            .map_err(|e| MetricError::Internal(format!("스케줄러 태스크 조인 실패: {e}")))?;
        info!("스케줄러 종료");
        Ok(())
    }

    /// 설정 변경 적용
    ///
    /// 실행 중에도 안전하다. 새 틱 주기는 누적기 상태를 건드리지 않고
    /// 다음 틱 경계부터 적용되며, 변경 내용은 틱 이전에 모든 리포터에
    /// 브로드캐스트된다. 정지 상태면 다음 `start`부터 적용된다.
    pub async fn reconfigure(&self, config: &PipelineConfig) -> Result<(), MetricError> {
        config.validate()?;
        self.dispatcher.reconfigure(config).await;
        self.interval_tx.send_replace(config.tick_interval());
        Ok(())
    }

    /// 실행 상태 여부
    pub async fn is_running(&self) -> bool {
        self.task.lock().await.handle.is_some()
    }

    /// 가장 최근 스냅샷 조회
    ///
    /// 첫 틱 이전이면 `NoSnapshot` — 빈 스냅샷을 조용히 반환하지 않는다.
    pub fn latest(&self) -> Result<Arc<PeriodSnapshot>, MetricError> {
        self.last_snapshot
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(MetricError::NoSnapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn scheduler_with_interval(ms: u64) -> SnapshotScheduler {
        let registry = Arc::new(MetricRegistry::new("system-metrics"));
        let dispatcher = Arc::new(ReporterDispatcher::new());
        let config = PipelineConfig {
            tick_interval_ms: ms,
            ..PipelineConfig::default_config()
        };
        SnapshotScheduler::new(registry, dispatcher, &config).unwrap()
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let registry = Arc::new(MetricRegistry::new("system-metrics"));
        let dispatcher = Arc::new(ReporterDispatcher::new());
        let config = PipelineConfig {
            tick_interval_ms: 0,
            ..PipelineConfig::default_config()
        };
        assert!(SnapshotScheduler::new(registry, dispatcher, &config).is_err());
    }

    #[tokio::test]
    async fn latest_before_first_tick_is_no_snapshot() {
        let scheduler = scheduler_with_interval(60_000);
        assert_matches!(scheduler.latest().unwrap_err(), MetricError::NoSnapshot);
    }

    #[tokio::test]
    async fn double_start_and_double_stop_are_noops() {
        let scheduler = scheduler_with_interval(60_000);
        assert!(!scheduler.is_running().await);

        scheduler.start().await.unwrap();
        scheduler.start().await.unwrap();
        assert!(scheduler.is_running().await);

        scheduler.stop().await.unwrap();
        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn reconfigure_while_stopped_is_ok() {
        let scheduler = scheduler_with_interval(60_000);
        let config = PipelineConfig {
            tick_interval_ms: 1_000,
            ..PipelineConfig::default_config()
        };
        scheduler.reconfigure(&config).await.unwrap();
    }

    #[tokio::test]
    async fn reconfigure_rejects_invalid_interval() {
        let scheduler = scheduler_with_interval(60_000);
        let config = PipelineConfig {
            tick_interval_ms: 0,
            ..PipelineConfig::default_config()
        };
        assert!(scheduler.reconfigure(&config).await.is_err());
    }
}
