//! 계측기 레지스트리.
//!
//! (이름, 종류)로 계측기를 생성/조회하고, 틱 경계에서 전체 상태를
//! `PeriodSnapshot`으로 드레인한다. 명시적으로 생성해 수집 드라이버와
//! 스케줄러에 참조로 전달한다 (전역 싱글턴 없음 — 편의 핸들은 `global` 참조).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use maekbak_core::config::PipelineConfig;
use maekbak_core::error::MetricError;
use maekbak_core::models::metric::{MetricKind, ResetPolicy};
use maekbak_core::models::snapshot::{MetricSeries, PeriodSnapshot};

use crate::instrument::{Counter, Gauge, Histogram};

/// 이름 하나에 등록된 계측기
enum InstrumentEntry {
    Counter(Counter),
    Histogram(Histogram),
    Gauge(Gauge),
}

impl InstrumentEntry {
    fn kind(&self) -> MetricKind {
        match self {
            Self::Counter(_) => MetricKind::Counter,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Gauge(_) => MetricKind::Gauge,
        }
    }
}

/// 계측기 레지스트리
///
/// 쓰기 경로(수집 드라이버 다수)와 주기 드레인(스케줄러 단일)이
/// 동시에 접근해도 안전하다. 계측기 생성은 (이름, 종류)에 대해
/// 멱등이며, 같은 이름을 다른 종류로 등록하면 `KindConflict`다.
pub struct MetricRegistry {
    component: String,
    default_counter_reset: ResetPolicy,
    instruments: RwLock<HashMap<String, InstrumentEntry>>,
}

impl MetricRegistry {
    /// 새 레지스트리 생성 (카운터 기본 정책: 주기별 리셋)
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            default_counter_reset: ResetPolicy::PerPeriod,
            instruments: RwLock::new(HashMap::new()),
        }
    }

    /// 파이프라인 설정으로 레지스트리 생성
    pub fn with_config(config: &PipelineConfig) -> Self {
        Self {
            component: config.component.clone(),
            default_counter_reset: config.counter_reset,
            instruments: RwLock::new(HashMap::new()),
        }
    }

    /// component 태그 값
    pub fn component(&self) -> &str {
        &self.component
    }

    /// 카운터 생성/조회 (레지스트리 기본 리셋 정책)
    pub fn counter(&self, name: &str) -> Result<Counter, MetricError> {
        self.counter_with_policy(name, self.default_counter_reset)
    }

    /// 카운터 생성/조회 (리셋 정책 지정)
    ///
    /// 이미 등록된 카운터면 기존 계측기를 반환한다 — 최초 등록 시점의
    /// 정책이 유지되며, 이후 호출의 `policy` 인자는 무시된다.
    pub fn counter_with_policy(
        &self,
        name: &str,
        policy: ResetPolicy,
    ) -> Result<Counter, MetricError> {
        if let Some(entry) = self.instruments.read().get(name) {
            return match entry {
                InstrumentEntry::Counter(c) => Ok(c.clone()),
                other => Err(self.kind_conflict(name, other.kind(), MetricKind::Counter)),
            };
        }

        let mut instruments = self.instruments.write();
        // 쓰기 잠금 획득 사이에 다른 쓰기자가 등록했을 수 있음
        match instruments.get(name) {
            Some(InstrumentEntry::Counter(c)) => Ok(c.clone()),
            Some(other) => Err(self.kind_conflict(name, other.kind(), MetricKind::Counter)),
            None => {
                let counter = Counter::new(name, &self.component, policy);
                instruments.insert(name.to_string(), InstrumentEntry::Counter(counter.clone()));
                debug!("카운터 등록: {name} (정책: {policy:?})");
                Ok(counter)
            }
        }
    }

    /// 히스토그램 생성/조회
    pub fn histogram(&self, name: &str) -> Result<Histogram, MetricError> {
        if let Some(entry) = self.instruments.read().get(name) {
            return match entry {
                InstrumentEntry::Histogram(h) => Ok(h.clone()),
                other => Err(self.kind_conflict(name, other.kind(), MetricKind::Histogram)),
            };
        }

        let mut instruments = self.instruments.write();
        match instruments.get(name) {
            Some(InstrumentEntry::Histogram(h)) => Ok(h.clone()),
            Some(other) => Err(self.kind_conflict(name, other.kind(), MetricKind::Histogram)),
            None => {
                let histogram = Histogram::new(name, &self.component);
                instruments.insert(
                    name.to_string(),
                    InstrumentEntry::Histogram(histogram.clone()),
                );
                debug!("히스토그램 등록: {name}");
                Ok(histogram)
            }
        }
    }

    /// 게이지 생성/조회
    pub fn gauge(&self, name: &str) -> Result<Gauge, MetricError> {
        if let Some(entry) = self.instruments.read().get(name) {
            return match entry {
                InstrumentEntry::Gauge(g) => Ok(g.clone()),
                other => Err(self.kind_conflict(name, other.kind(), MetricKind::Gauge)),
            };
        }

        let mut instruments = self.instruments.write();
        match instruments.get(name) {
            Some(InstrumentEntry::Gauge(g)) => Ok(g.clone()),
            Some(other) => Err(self.kind_conflict(name, other.kind(), MetricKind::Gauge)),
            None => {
                let gauge = Gauge::new(name, &self.component);
                instruments.insert(name.to_string(), InstrumentEntry::Gauge(gauge.clone()));
                debug!("게이지 등록: {name}");
                Ok(gauge)
            }
        }
    }

    /// 등록된 계측기 수
    pub fn instrument_count(&self) -> usize {
        self.instruments.read().len()
    }

    /// 틱 경계 드레인 — 전체 계측기 상태를 스냅샷으로 캡처
    ///
    /// 반환되는 스냅샷은 값의 복사본이며 라이브 누적기에 대한 참조를
    /// 갖지 않는다. 카운터/히스토그램은 정책에 따라 리셋되고 게이지는
    /// 그대로 유지된다. 시리즈는 이름 오름차순.
    pub fn drain_snapshot(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> PeriodSnapshot {
        // 계측기 목록 복사 후 잠금 해제 — 드레인 중 등록을 막지 않음
        let entries: Vec<(String, MetricKind, InstrumentEntry)> = {
            let instruments = self.instruments.read();
            instruments
                .iter()
                .map(|(name, entry)| {
                    let cloned = match entry {
                        InstrumentEntry::Counter(c) => InstrumentEntry::Counter(c.clone()),
                        InstrumentEntry::Histogram(h) => InstrumentEntry::Histogram(h.clone()),
                        InstrumentEntry::Gauge(g) => InstrumentEntry::Gauge(g.clone()),
                    };
                    (name.clone(), entry.kind(), cloned)
                })
                .collect()
        };

        let mut series: Vec<MetricSeries> = entries
            .into_iter()
            .map(|(name, kind, entry)| {
                let points = match &entry {
                    InstrumentEntry::Counter(c) => c.drain_points(),
                    InstrumentEntry::Histogram(h) => h.drain_points(),
                    InstrumentEntry::Gauge(g) => g.drain_points(),
                };
                MetricSeries { name, kind, points }
            })
            .collect();
        series.sort_by(|a, b| a.name.cmp(&b.name));

        let snapshot = PeriodSnapshot { from, to, series };
        debug!(
            "스냅샷 드레인: 시리즈 {}개, 포인트 {}개",
            snapshot.series.len(),
            snapshot.point_count()
        );
        snapshot
    }

    fn kind_conflict(
        &self,
        name: &str,
        existing: MetricKind,
        requested: MetricKind,
    ) -> MetricError {
        MetricError::KindConflict {
            name: name.to_string(),
            existing,
            requested,
        }
    }
}
