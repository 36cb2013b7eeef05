//! 인메모리 리포터.
//!
//! 최근 스냅샷과 제한된 이력을 메모리에 보관한다.
//! 로컬 조회(테스트 하네스, 진단 뷰)용 관측 엔드포인트.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use maekbak_core::config::PipelineConfig;
use maekbak_core::error::MetricError;
use maekbak_core::models::snapshot::PeriodSnapshot;
use maekbak_core::ports::reporter::Reporter;

/// 인메모리 리포터 — 최근 스냅샷 보관
pub struct MemoryReporter {
    name: String,
    /// 이력 보관 한도
    capacity: usize,
    latest: RwLock<Option<Arc<PeriodSnapshot>>>,
    history: Mutex<VecDeque<Arc<PeriodSnapshot>>>,
    received: AtomicUsize,
    started: AtomicBool,
    last_config: RwLock<Option<PipelineConfig>>,
}

impl MemoryReporter {
    /// 새 인메모리 리포터 생성
    pub fn new(capacity: usize) -> Self {
        Self {
            name: "memory".to_string(),
            capacity: capacity.max(1),
            latest: RwLock::new(None),
            history: Mutex::new(VecDeque::new()),
            received: AtomicUsize::new(0),
            started: AtomicBool::new(false),
            last_config: RwLock::new(None),
        }
    }

    /// 가장 최근 스냅샷 조회
    ///
    /// 아직 전달받은 스냅샷이 없으면 `NoSnapshot` — 빈 기본값을
    /// 조용히 반환하지 않는다.
    pub fn latest(&self) -> Result<Arc<PeriodSnapshot>, MetricError> {
        self.latest
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(MetricError::NoSnapshot)
    }

    /// 보관 중인 이력 (오래된 것부터)
    pub fn history(&self) -> Vec<Arc<PeriodSnapshot>> {
        self.history.lock().iter().map(Arc::clone).collect()
    }

    /// 지금까지 전달받은 스냅샷 수 (이력 한도와 무관)
    pub fn delivery_count(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }

    /// 시작 상태 여부
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    /// 마지막으로 통지받은 설정
    pub fn last_config(&self) -> Option<PipelineConfig> {
        self.last_config.read().clone()
    }
}

#[async_trait]
impl Reporter for MemoryReporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), MetricError> {
        self.started.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn stop(&self) -> Result<(), MetricError> {
        self.started.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn reconfigure(&self, config: &PipelineConfig) -> Result<(), MetricError> {
        *self.last_config.write() = Some(config.clone());
        Ok(())
    }

    async fn report_period_snapshot(
        &self,
        snapshot: Arc<PeriodSnapshot>,
    ) -> Result<(), MetricError> {
        {
            let mut history = self.history.lock();
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(Arc::clone(&snapshot));
        }
        *self.latest.write() = Some(snapshot);
        let count = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("인메모리 리포터 수신: 누계 {count}개");
        Ok(())
    }
}
