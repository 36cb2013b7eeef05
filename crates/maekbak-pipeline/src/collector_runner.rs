//! 수집 드라이버 러너.
//!
//! 등록된 `CollectorDriver`들을 수집 주기마다 순차 호출하는 루프.
//! 드라이버 하나의 에러는 격리되어 다른 드라이버와 루프에 전파되지 않는다.
//! 드라이버가 값을 어디서 얻는지(syscall 등)는 러너가 알지 못한다.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use maekbak_core::error::MetricError;
use maekbak_core::ports::collector::CollectorDriver;

/// 실행 중인 수집 태스크 상태
#[derive(Default)]
struct RunnerTask {
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

/// 수집 러너
pub struct CollectorRunner {
    drivers: Vec<Arc<dyn CollectorDriver>>,
    task: Mutex<RunnerTask>,
}

impl CollectorRunner {
    /// 새 러너 생성 (드라이버 없음)
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
            task: Mutex::new(RunnerTask::default()),
        }
    }

    /// 수집 드라이버 추가 (빌더 스타일, 시작 전에만 가능)
    pub fn with_driver(mut self, driver: Arc<dyn CollectorDriver>) -> Self {
        self.drivers.push(driver);
        self
    }

    /// 등록된 드라이버 수
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// 수집 루프 시작
    ///
    /// 이미 실행 중이면 no-op. `collect_interval`이 0이면 `Config` 에러.
    pub async fn start(&self, collect_interval: Duration) -> Result<(), MetricError> {
        if collect_interval.is_zero() {
            return Err(MetricError::Config("수집 주기는 0일 수 없음".to_string()));
        }

        let mut task = self.task.lock().await;
        if task.handle.is_some() {
            warn!("수집 러너가 이미 실행 중 — start 무시");
            return Ok(());
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let drivers = self.drivers.clone();

        let handle = tokio::spawn(async move {
            info!(
                "수집 러너 시작: 드라이버 {}개, 주기 {}ms",
                drivers.len(),
                collect_interval.as_millis()
            );
            let mut interval = tokio::time::interval_at(
                tokio::time::Instant::now() + collect_interval,
                collect_interval,
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        for driver in &drivers {
                            if let Err(e) = driver.collect().await {
                                warn!("수집 드라이버 실패: {}: {e}", driver.name());
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("수집 루프 종료");
                        break;
                    }
                }
            }
        });

        task.shutdown_tx = Some(shutdown_tx);
        task.handle = Some(handle);
        Ok(())
    }

    /// 수집 루프 종료 — 진행 중인 수집이 끝난 뒤 반환
    pub async fn stop(&self) -> Result<(), MetricError> {
        let mut task = self.task.lock().await;
        let Some(handle) = task.handle.take() else {
            debug!("수집 러너가 실행 중이 아님 — stop 무시");
            return Ok(());
        };

        if let Some(shutdown_tx) = task.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
        handle
            .await
            .map_err(|e| MetricError::Internal(format!("수집 태스크 조인 실패: {e}")))?;
        info!("수집 러너 종료");
        Ok(())
    }

    /// 실행 상태 여부
    pub async fn is_running(&self) -> bool {
        self.task.lock().await.handle.is_some()
    }
}

impl Default for CollectorRunner {
    fn default() -> Self {
        Self::new()
    }
}
