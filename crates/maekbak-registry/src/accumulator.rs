//! 태그 단위 누적기 셀.
//!
//! 쓰기 경로(`increment`/`record`/`set`)는 블로킹 없이 동작하고,
//! 틱 시점의 드레인은 atomic swap으로 현재 윈도우를 교체한다.
//! swap과 동시에 도착한 쓰기는 이전/다음 윈도우 중 정확히 한쪽에
//! 귀속된다 — 유실도 중복 계수도 없다.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use maekbak_core::models::metric::{HistogramSummary, ResetPolicy};

/// 카운터 셀 — 단조 증가 정수
#[derive(Debug, Default)]
pub struct CounterCell {
    current: AtomicU64,
}

impl CounterCell {
    /// 새 카운터 셀 (0에서 시작)
    pub fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
        }
    }

    /// n만큼 증가 (lock-free)
    pub fn increment(&self, n: u64) {
        self.current.fetch_add(n, Ordering::Relaxed);
    }

    /// 틱 경계 캡처
    ///
    /// `PerPeriod`면 swap으로 0으로 리셋하며 누계를 반환하고,
    /// `Cumulative`면 리셋 없이 현재 누계를 읽는다.
    pub fn capture(&self, policy: ResetPolicy) -> u64 {
        match policy {
            ResetPolicy::PerPeriod => self.current.swap(0, Ordering::Relaxed),
            ResetPolicy::Cumulative => self.current.load(Ordering::Relaxed),
        }
    }

    /// 리셋 없이 현재 누계 조회
    pub fn peek(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }
}

/// 게이지 셀 — 마지막 기록값
///
/// 드레인해도 리셋되지 않는다. 초기값은 0.
#[derive(Debug, Default)]
pub struct GaugeCell {
    current: AtomicI64,
}

impl GaugeCell {
    /// 새 게이지 셀
    pub fn new() -> Self {
        Self {
            current: AtomicI64::new(0),
        }
    }

    /// 값 기록 (lock-free, 마지막 쓰기가 이김)
    pub fn set(&self, value: i64) {
        self.current.store(value, Ordering::Relaxed);
    }

    /// 현재 값 조회
    pub fn read(&self) -> i64 {
        self.current.load(Ordering::Relaxed)
    }
}

/// 히스토그램 셀 — 주기 윈도우 분포
///
/// 윈도우는 (값, 기록 횟수) 쌍의 목록. 드레인 시 `mem::take`로
/// 윈도우를 통째로 교체한 뒤 잠금 밖에서 요약을 계산한다.
#[derive(Debug, Default)]
pub struct HistogramCell {
    window: Mutex<Vec<(i64, u64)>>,
}

impl HistogramCell {
    /// 새 히스토그램 셀 (빈 윈도우)
    pub fn new() -> Self {
        Self {
            window: Mutex::new(Vec::new()),
        }
    }

    /// 값 1회 기록
    pub fn record(&self, value: i64) {
        self.record_n(value, 1);
    }

    /// 값 count회 기록 (count == 0이면 무시)
    pub fn record_n(&self, value: i64, count: u64) {
        if count == 0 {
            return;
        }
        self.window.lock().push((value, count));
    }

    /// 윈도우 드레인 및 요약 생성 (윈도우는 비워짐)
    pub fn drain(&self) -> HistogramSummary {
        let entries = std::mem::take(&mut *self.window.lock());
        summarize(entries)
    }

    /// 현재 윈도우의 기록 횟수 합계 (리셋 없음)
    pub fn peek_count(&self) -> u64 {
        self.window.lock().iter().map(|(_, c)| *c).sum()
    }
}

/// (값, 횟수) 윈도우를 주기 요약으로 환산
fn summarize(mut entries: Vec<(i64, u64)>) -> HistogramSummary {
    if entries.is_empty() {
        return HistogramSummary::empty();
    }

    entries.sort_unstable_by_key(|(v, _)| *v);

    let count: u64 = entries.iter().map(|(_, c)| *c).sum();
    let sum: i64 = entries
        .iter()
        .fold(0i64, |acc, (v, c)| acc.saturating_add(v.saturating_mul(*c as i64)));
    let min = entries[0].0;
    let max = entries[entries.len() - 1].0;

    HistogramSummary {
        count,
        sum,
        min,
        max,
        p50: weighted_percentile(&entries, count, 0.50),
        p90: weighted_percentile(&entries, count, 0.90),
        p99: weighted_percentile(&entries, count, 0.99),
    }
}

/// 횟수 가중 백분위 — 누적 횟수가 ceil(q * total) 이상이 되는 첫 값
fn weighted_percentile(sorted: &[(i64, u64)], total: u64, q: f64) -> i64 {
    let rank = ((q * total as f64).ceil() as u64).max(1);
    let mut cumulative = 0u64;
    for (value, count) in sorted {
        cumulative += count;
        if cumulative >= rank {
            return *value;
        }
    }
    sorted.last().map(|(v, _)| *v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counter_capture_per_period_resets() {
        let cell = CounterCell::new();
        cell.increment(5);
        cell.increment(10);

        assert_eq!(cell.capture(ResetPolicy::PerPeriod), 15);
        assert_eq!(cell.capture(ResetPolicy::PerPeriod), 0);
    }

    #[test]
    fn counter_capture_cumulative_keeps_total() {
        let cell = CounterCell::new();
        cell.increment(5);

        assert_eq!(cell.capture(ResetPolicy::Cumulative), 5);
        cell.increment(3);
        assert_eq!(cell.capture(ResetPolicy::Cumulative), 8);
    }

    #[test]
    fn increments_after_drain_land_in_next_window() {
        let cell = CounterCell::new();
        cell.increment(7);
        assert_eq!(cell.capture(ResetPolicy::PerPeriod), 7);

        cell.increment(2);
        assert_eq!(cell.capture(ResetPolicy::PerPeriod), 2);
    }

    #[test]
    fn concurrent_increments_all_counted() {
        let cell = Arc::new(CounterCell::new());

        // 10개 스레드에서 동시에 1000번씩 증가
        let mut handles = vec![];
        for _ in 0..10 {
            let cell = Arc::clone(&cell);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    cell.increment(1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cell.capture(ResetPolicy::PerPeriod), 10_000);
    }

    #[test]
    fn gauge_keeps_last_written_value() {
        let cell = GaugeCell::new();
        assert_eq!(cell.read(), 0);

        cell.set(1000);
        cell.set(2000);
        assert_eq!(cell.read(), 2000);
        // 드레인 개념이 없으므로 읽어도 값 유지
        assert_eq!(cell.read(), 2000);
    }

    #[test]
    fn histogram_drain_clears_window() {
        let cell = HistogramCell::new();
        cell.record(10);
        cell.record(20);
        cell.record(30);

        let summary = cell.drain();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.sum, 60);
        assert_eq!(summary.min, 10);
        assert_eq!(summary.max, 30);

        let empty = cell.drain();
        assert_eq!(empty, HistogramSummary::empty());
    }

    #[test]
    fn histogram_weighted_counts() {
        let cell = HistogramCell::new();
        cell.record_n(1, 99);
        cell.record_n(100, 1);

        let summary = cell.drain();
        assert_eq!(summary.count, 100);
        assert_eq!(summary.p50, 1);
        assert_eq!(summary.p90, 1);
        assert_eq!(summary.p99, 1);
        assert_eq!(summary.max, 100);
    }

    #[test]
    fn histogram_zero_count_record_ignored() {
        let cell = HistogramCell::new();
        cell.record_n(42, 0);
        assert_eq!(cell.drain(), HistogramSummary::empty());
    }

    #[test]
    fn percentile_single_value() {
        let entries = vec![(7, 1)];
        assert_eq!(weighted_percentile(&entries, 1, 0.50), 7);
        assert_eq!(weighted_percentile(&entries, 1, 0.99), 7);
    }

    #[test]
    fn percentile_uniform_distribution() {
        // 1..=100을 한 번씩 기록
        let entries: Vec<(i64, u64)> = (1..=100).map(|v| (v, 1)).collect();
        assert_eq!(weighted_percentile(&entries, 100, 0.50), 50);
        assert_eq!(weighted_percentile(&entries, 100, 0.90), 90);
        assert_eq!(weighted_percentile(&entries, 100, 0.99), 99);
    }
}
