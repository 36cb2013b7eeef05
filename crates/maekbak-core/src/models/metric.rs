//! 메트릭 식별자와 값 모델.
//!
//! 계측기 종류, 태그 집합, 스냅샷에 담기는 값 타입을 정의한다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 계측기 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// 단조 증가 카운터 (주기마다 리셋 가능)
    Counter,
    /// 관측값 분포 (count/min/max/백분위)
    Histogram,
    /// 마지막 기록값 (리셋 없음)
    Gauge,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Histogram => write!(f, "histogram"),
            Self::Gauge => write!(f, "gauge"),
        }
    }
}

/// 카운터 리셋 정책
///
/// 주기별 델타(`PerPeriod`)와 프로세스 수명 누적(`Cumulative`) 중 선택.
/// 히스토그램은 항상 주기별, 게이지는 항상 누적이므로 카운터에만 적용된다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// 틱마다 0으로 리셋 (기본값)
    #[default]
    PerPeriod,
    /// 리셋 없이 누적
    Cumulative,
}

/// 태그 집합 — 불변 키/값 라벨
///
/// `BTreeMap` 기반이라 키 삽입 순서와 무관하게 값 동등성이 성립하고,
/// `Hash`/`Ord`가 유도되어 맵 키로 바로 사용할 수 있다.
/// 레지스트리가 정제(refine) 시점에 `component` 태그를 주입한다.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    /// 빈 태그 집합 생성
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 태그 추가 (빌더 스타일, 같은 키는 덮어씀)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// 다른 태그 집합과 병합한 새 집합 반환 (`other`의 키가 우선)
    pub fn merged(&self, other: &Self) -> Self {
        let mut map = self.0.clone();
        for (k, v) in &other.0 {
            map.insert(k.clone(), v.clone());
        }
        Self(map)
    }

    /// 키에 해당하는 값 조회
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// 키/값 쌍 보유 여부
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// 태그 개수
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 빈 집합 여부
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 키/값 쌍 순회 (키 오름차순)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

/// 히스토그램 주기 요약
///
/// 한 주기 동안 기록된 값들의 분포. 백분위는 기록 횟수 가중치 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// 기록 횟수 합계
    pub count: u64,
    /// 값 합계 (count 가중)
    pub sum: i64,
    /// 최솟값
    pub min: i64,
    /// 최댓값
    pub max: i64,
    /// 50 백분위
    pub p50: i64,
    /// 90 백분위
    pub p90: i64,
    /// 99 백분위
    pub p99: i64,
}

impl HistogramSummary {
    /// 기록이 없는 빈 요약
    pub fn empty() -> Self {
        Self {
            count: 0,
            sum: 0,
            min: 0,
            max: 0,
            p50: 0,
            p90: 0,
            p99: 0,
        }
    }
}

/// 스냅샷에 담기는 메트릭 값
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    /// 카운터 누계 (주기별 또는 누적, 리셋 정책에 따름)
    Counter(u64),
    /// 게이지 최종 기록값
    Gauge(i64),
    /// 히스토그램 주기 요약
    Histogram(HistogramSummary),
}

impl MetricValue {
    /// 카운터 값 추출
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            Self::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// 게이지 값 추출
    pub fn as_gauge(&self) -> Option<i64> {
        match self {
            Self::Gauge(v) => Some(*v),
            _ => None,
        }
    }

    /// 히스토그램 요약 추출
    pub fn as_histogram(&self) -> Option<&HistogramSummary> {
        match self {
            Self::Histogram(h) => Some(h),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_set_equality_ignores_insertion_order() {
        let a = TagSet::new().with("mode", "user").with("cpu", "0");
        let b = TagSet::new().with("cpu", "0").with("mode", "user");
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn tag_set_with_overwrites_same_key() {
        let tags = TagSet::new().with("mode", "user").with("mode", "system");
        assert_eq!(tags.get("mode"), Some("system"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn tag_set_merged_prefers_other() {
        let base = TagSet::new().with("component", "system-metrics");
        let tags = TagSet::new().with("mode", "user");
        let merged = tags.merged(&base);
        assert!(merged.contains("mode", "user"));
        assert!(merged.contains("component", "system-metrics"));
    }

    #[test]
    fn tag_set_serde_roundtrip() {
        let tags = TagSet::new().with("mode", "user").with("component", "system-metrics");
        let json = serde_json::to_string(&tags).unwrap();
        let back: TagSet = serde_json::from_str(&json).unwrap();
        assert_eq!(tags, back);
    }

    #[test]
    fn metric_value_accessors() {
        assert_eq!(MetricValue::Counter(15).as_counter(), Some(15));
        assert_eq!(MetricValue::Gauge(-3).as_gauge(), Some(-3));
        assert!(MetricValue::Counter(1).as_gauge().is_none());
    }

    #[test]
    fn kind_display() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Histogram.to_string(), "histogram");
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
    }
}
