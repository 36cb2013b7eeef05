//! 계측기와 태그 정제.
//!
//! 계측기(Counter/Histogram/Gauge)는 이름 하나에 대응하고,
//! `refine`으로 태그 집합별 누적기 핸들을 얻는다.
//! 정제 시 레지스트리의 component 태그가 자동 주입되며,
//! 태그 집합 → 누적기 맵은 증가만 한다 (기존 항목은 제거되지 않음).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use maekbak_core::models::metric::{MetricKind, MetricValue, ResetPolicy, TagSet};
use maekbak_core::models::snapshot::MetricPoint;

use crate::accumulator::{CounterCell, GaugeCell, HistogramCell};

/// 태그 집합 → 누적기 셀 맵
///
/// 읽기 우선 경로로 조회하고, 처음 보는 태그 집합만 쓰기 잠금으로 생성한다.
#[derive(Debug)]
struct RefinementMap<C> {
    component_tag: TagSet,
    cells: RwLock<HashMap<TagSet, Arc<C>>>,
}

impl<C: Default> RefinementMap<C> {
    fn new(component: &str) -> Self {
        Self {
            component_tag: TagSet::new().with("component", component),
            cells: RwLock::new(HashMap::new()),
        }
    }

    /// 태그 집합 정제 — 없으면 생성
    fn refine(&self, tags: TagSet) -> Arc<C> {
        let tags = tags.merged(&self.component_tag);
        if let Some(cell) = self.cells.read().get(&tags) {
            return Arc::clone(cell);
        }
        let mut cells = self.cells.write();
        Arc::clone(cells.entry(tags).or_default())
    }

    /// (태그, 셀) 목록 복사본 (태그 오름차순)
    ///
    /// 잠금은 복사 동안만 유지한다. 드레인 중에 새로 정제된 태그 집합은
    /// 다음 스냅샷부터 포함된다.
    fn entries(&self) -> Vec<(TagSet, Arc<C>)> {
        let mut entries: Vec<_> = self
            .cells
            .read()
            .iter()
            .map(|(tags, cell)| (tags.clone(), Arc::clone(cell)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

// ============================================================
// 카운터
// ============================================================

struct CounterInner {
    name: String,
    policy: ResetPolicy,
    map: RefinementMap<CounterCell>,
}

/// 카운터 계측기 — 단조 증가 정수, 리셋 정책에 따라 주기별/누적 보고
#[derive(Clone)]
pub struct Counter {
    inner: Arc<CounterInner>,
}

impl Counter {
    pub(crate) fn new(name: &str, component: &str, policy: ResetPolicy) -> Self {
        Self {
            inner: Arc::new(CounterInner {
                name: name.to_string(),
                policy,
                map: RefinementMap::new(component),
            }),
        }
    }

    /// 메트릭 이름
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 계측기 종류
    pub fn kind(&self) -> MetricKind {
        MetricKind::Counter
    }

    /// 이 카운터의 리셋 정책
    pub fn reset_policy(&self) -> ResetPolicy {
        self.inner.policy
    }

    /// 태그 집합 정제 — 해당 태그의 쓰기 핸들 반환 (없으면 생성)
    pub fn refine(&self, tags: TagSet) -> CounterHandle {
        CounterHandle {
            cell: self.inner.map.refine(tags),
        }
    }

    /// 틱 경계 드레인 — 모든 태그 집합의 값 캡처
    pub(crate) fn drain_points(&self) -> Vec<MetricPoint> {
        self.inner
            .map
            .entries()
            .into_iter()
            .map(|(tags, cell)| MetricPoint {
                tags,
                value: MetricValue::Counter(cell.capture(self.inner.policy)),
            })
            .collect()
    }
}

/// 태그 범위 카운터 핸들 (쓰기 전용, 저비용 clone)
#[derive(Clone)]
pub struct CounterHandle {
    cell: Arc<CounterCell>,
}

impl CounterHandle {
    /// n만큼 증가
    pub fn increment(&self, n: u64) {
        self.cell.increment(n);
    }
}

// ============================================================
// 히스토그램
// ============================================================

#[derive(Debug)]
struct HistogramInner {
    name: String,
    map: RefinementMap<HistogramCell>,
}

/// 히스토그램 계측기 — 주기별 분포, 틱마다 윈도우 리셋
#[derive(Debug, Clone)]
pub struct Histogram {
    inner: Arc<HistogramInner>,
}

impl Histogram {
    pub(crate) fn new(name: &str, component: &str) -> Self {
        Self {
            inner: Arc::new(HistogramInner {
                name: name.to_string(),
                map: RefinementMap::new(component),
            }),
        }
    }

    /// 메트릭 이름
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 계측기 종류
    pub fn kind(&self) -> MetricKind {
        MetricKind::Histogram
    }

    /// 태그 집합 정제
    pub fn refine(&self, tags: TagSet) -> HistogramHandle {
        HistogramHandle {
            cell: self.inner.map.refine(tags),
        }
    }

    /// 틱 경계 드레인 — 모든 태그 집합의 윈도우 요약 및 비우기
    pub(crate) fn drain_points(&self) -> Vec<MetricPoint> {
        self.inner
            .map
            .entries()
            .into_iter()
            .map(|(tags, cell)| MetricPoint {
                tags,
                value: MetricValue::Histogram(cell.drain()),
            })
            .collect()
    }
}

/// 태그 범위 히스토그램 핸들
#[derive(Clone)]
pub struct HistogramHandle {
    cell: Arc<HistogramCell>,
}

impl HistogramHandle {
    /// 값 1회 기록
    pub fn record(&self, value: i64) {
        self.cell.record(value);
    }

    /// 값 count회 기록
    pub fn record_n(&self, value: i64, count: u64) {
        self.cell.record_n(value, count);
    }
}

// ============================================================
// 게이지
// ============================================================

#[derive(Debug)]
struct GaugeInner {
    name: String,
    map: RefinementMap<GaugeCell>,
}

/// 게이지 계측기 — 마지막 기록값, 리셋 없음
#[derive(Debug, Clone)]
pub struct Gauge {
    inner: Arc<GaugeInner>,
}

impl Gauge {
    pub(crate) fn new(name: &str, component: &str) -> Self {
        Self {
            inner: Arc::new(GaugeInner {
                name: name.to_string(),
                map: RefinementMap::new(component),
            }),
        }
    }

    /// 메트릭 이름
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 계측기 종류
    pub fn kind(&self) -> MetricKind {
        MetricKind::Gauge
    }

    /// 태그 집합 정제
    pub fn refine(&self, tags: TagSet) -> GaugeHandle {
        GaugeHandle {
            cell: self.inner.map.refine(tags),
        }
    }

    /// 틱 경계 드레인 — 모든 태그 집합의 현재 값 읽기 (리셋 없음)
    pub(crate) fn drain_points(&self) -> Vec<MetricPoint> {
        self.inner
            .map
            .entries()
            .into_iter()
            .map(|(tags, cell)| MetricPoint {
                tags,
                value: MetricValue::Gauge(cell.read()),
            })
            .collect()
    }
}

/// 태그 범위 게이지 핸들
#[derive(Clone)]
pub struct GaugeHandle {
    cell: Arc<GaugeCell>,
}

impl GaugeHandle {
    /// 값 기록 (마지막 쓰기가 이김)
    pub fn set(&self, value: i64) {
        self.cell.set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_injects_component_tag() {
        let counter = Counter::new("host.cpu", "system-metrics", ResetPolicy::PerPeriod);
        counter.refine(TagSet::new().with("mode", "user")).increment(5);

        let points = counter.drain_points();
        assert_eq!(points.len(), 1);
        assert!(points[0].tags.contains("mode", "user"));
        assert!(points[0].tags.contains("component", "system-metrics"));
    }

    #[test]
    fn same_tags_share_one_cell() {
        let counter = Counter::new("host.cpu", "system-metrics", ResetPolicy::PerPeriod);
        let a = counter.refine(TagSet::new().with("mode", "user"));
        let b = counter.refine(TagSet::new().with("mode", "user"));

        a.increment(3);
        b.increment(4);

        let points = counter.drain_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value.as_counter(), Some(7));
    }

    #[test]
    fn distinct_tags_accumulate_independently() {
        let counter = Counter::new("host.cpu", "system-metrics", ResetPolicy::PerPeriod);
        counter.refine(TagSet::new().with("mode", "user")).increment(10);
        counter.refine(TagSet::new().with("mode", "system")).increment(1);

        let points = counter.drain_points();
        assert_eq!(points.len(), 2);

        let user = points
            .iter()
            .find(|p| p.tags.contains("mode", "user"))
            .unwrap();
        let system = points
            .iter()
            .find(|p| p.tags.contains("mode", "system"))
            .unwrap();
        assert_eq!(user.value.as_counter(), Some(10));
        assert_eq!(system.value.as_counter(), Some(1));
    }

    #[test]
    fn refined_tag_set_survives_drain() {
        // grow-only: 한 번 정제된 태그 집합은 이후 스냅샷에도 계속 나타남
        let counter = Counter::new("host.cpu", "system-metrics", ResetPolicy::PerPeriod);
        counter.refine(TagSet::new().with("mode", "user")).increment(2);

        assert_eq!(counter.drain_points().len(), 1);
        let second = counter.drain_points();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].value.as_counter(), Some(0));
    }

    #[test]
    fn gauge_drain_does_not_reset() {
        let gauge = Gauge::new("jvm.memory", "system-metrics");
        gauge.refine(TagSet::new().with("segment", "heap")).set(1000);

        let first = gauge.drain_points();
        assert_eq!(first[0].value.as_gauge(), Some(1000));
        let second = gauge.drain_points();
        assert_eq!(second[0].value.as_gauge(), Some(1000));
    }

    #[test]
    fn histogram_drain_resets_window() {
        let histogram = Histogram::new("proc.gc.pause", "system-metrics");
        let handle = histogram.refine(TagSet::new());
        handle.record(10);
        handle.record(30);

        let first = histogram.drain_points();
        let summary = first[0].value.as_histogram().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.max, 30);

        let second = histogram.drain_points();
        assert_eq!(second[0].value.as_histogram().unwrap().count, 0);
    }

    #[test]
    fn drain_points_sorted_by_tags() {
        let counter = Counter::new("host.cpu", "system-metrics", ResetPolicy::PerPeriod);
        counter.refine(TagSet::new().with("mode", "user")).increment(1);
        counter.refine(TagSet::new().with("mode", "idle")).increment(1);
        counter.refine(TagSet::new().with("mode", "system")).increment(1);

        let points = counter.drain_points();
        let modes: Vec<_> = points
            .iter()
            .map(|p| p.tags.get("mode").unwrap().to_string())
            .collect();
        let mut sorted = modes.clone();
        sorted.sort();
        assert_eq!(modes, sorted);
    }
}
