//! 리포터 레지스트리 & 디스패처.
//!
//! 활성 리포터 목록을 등록 순서대로 보관하고, 틱마다 스냅샷을
//! 순차 전달한다. 리포터 하나의 에러는 디스패치 경계에서 격리되어
//! 다른 리포터와 틱 루프에 전파되지 않는다.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use maekbak_core::config::PipelineConfig;
use maekbak_core::error::MetricError;
use maekbak_core::models::snapshot::PeriodSnapshot;
use maekbak_core::ports::reporter::Reporter;

/// 리포터 디스패처
///
/// 느린 리포터는 이후 리포터의 전달을 지연시키지만, 모든 리포터는
/// 동일한 불변 `Arc<PeriodSnapshot>`을 본다.
pub struct ReporterDispatcher {
    /// 활성 리포터 (등록 순서 유지)
    reporters: RwLock<Vec<Arc<dyn Reporter>>>,
}

impl ReporterDispatcher {
    /// 새 디스패처 생성 (리포터 없음)
    pub fn new() -> Self {
        Self {
            reporters: RwLock::new(Vec::new()),
        }
    }

    /// 리포터 등록 및 시작
    ///
    /// 같은 이름의 리포터가 이미 있으면 `Config` 에러 — 조용한 중복
    /// 등록(스냅샷 이중 전달)을 허용하지 않는다. `start` 실패 시
    /// 등록하지 않고 에러를 반환한다.
    pub async fn add_reporter(&self, reporter: Arc<dyn Reporter>) -> Result<(), MetricError> {
        let mut reporters = self.reporters.write().await;
        if reporters.iter().any(|r| r.name() == reporter.name()) {
            return Err(MetricError::Config(format!(
                "이미 등록된 리포터: {}",
                reporter.name()
            )));
        }

        reporter.start().await?;
        info!("리포터 등록: {}", reporter.name());
        reporters.push(reporter);
        Ok(())
    }

    /// 리포터 해제 및 종료
    ///
    /// 이름이 없으면 `NotFound`. `stop` 에러는 로그만 남긴다 —
    /// 해제 자체는 이미 완료된 상태다.
    pub async fn remove_reporter(&self, name: &str) -> Result<(), MetricError> {
        let removed = {
            let mut reporters = self.reporters.write().await;
            let position = reporters.iter().position(|r| r.name() == name).ok_or_else(|| {
                MetricError::NotFound {
                    resource_type: "Reporter".to_string(),
                    id: name.to_string(),
                }
            })?;
            reporters.remove(position)
        };

        if let Err(e) = removed.stop().await {
            warn!("리포터 종료 실패: {name}: {e}");
        }
        info!("리포터 해제: {name}");
        Ok(())
    }

    /// 스냅샷 디스패치 — 등록 순서대로 순차 전달
    ///
    /// 리포터 에러는 여기서 잡아 로그로만 남긴다.
    pub async fn dispatch(&self, snapshot: Arc<PeriodSnapshot>) {
        let reporters: Vec<Arc<dyn Reporter>> = self.reporters.read().await.clone();
        for reporter in reporters {
            if let Err(e) = reporter.report_period_snapshot(Arc::clone(&snapshot)).await {
                warn!("리포터 디스패치 실패: {}: {e}", reporter.name());
            }
        }
    }

    /// 설정 변경을 모든 리포터에 브로드캐스트
    pub async fn reconfigure(&self, config: &PipelineConfig) {
        let reporters: Vec<Arc<dyn Reporter>> = self.reporters.read().await.clone();
        for reporter in reporters {
            if let Err(e) = reporter.reconfigure(config).await {
                warn!("리포터 설정 변경 실패: {}: {e}", reporter.name());
            }
        }
    }

    /// 현재 등록된 리포터 수
    pub async fn reporter_count(&self) -> usize {
        self.reporters.read().await.len()
    }
}

impl Default for ReporterDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
