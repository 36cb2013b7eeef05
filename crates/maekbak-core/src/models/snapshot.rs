//! 주기 스냅샷 모델.
//!
//! 한 틱 구간의 모든 계측기 값을 담는 불변 레코드.
//! 디스패처가 `Arc`로 공유하며 발행 이후 절대 변경되지 않는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metric::{MetricKind, MetricValue, TagSet};

/// 태그 집합 하나에 대한 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// 태그 집합 (component 태그 포함)
    pub tags: TagSet,
    /// 틱 경계에서 캡처된 값
    pub value: MetricValue,
}

/// 계측기 하나의 주기 시계열
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// 메트릭 이름 (예: "host.cpu")
    pub name: String,
    /// 계측기 종류
    pub kind: MetricKind,
    /// 태그 집합별 값 (태그 오름차순 정렬)
    pub points: Vec<MetricPoint>,
}

/// 주기 스냅샷
///
/// `from`은 이전 틱 종료 시각(첫 틱은 시작 시각), `to`는 현재 틱 시각.
/// 시리즈는 이름 오름차순으로 정렬되어 출력이 결정적이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// 주기 시작 시각
    pub from: DateTime<Utc>,
    /// 주기 종료 시각 (틱 시각)
    pub to: DateTime<Utc>,
    /// 계측기별 시계열
    pub series: Vec<MetricSeries>,
}

impl PeriodSnapshot {
    /// 이름으로 시리즈 조회
    pub fn series_of(&self, name: &str) -> Option<&MetricSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// (이름, 태그 집합)으로 값 조회
    pub fn value_of(&self, name: &str, tags: &TagSet) -> Option<&MetricValue> {
        self.series_of(name)?
            .points
            .iter()
            .find(|p| &p.tags == tags)
            .map(|p| &p.value)
    }

    /// 전체 포인트 수
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// 시리즈가 하나도 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
