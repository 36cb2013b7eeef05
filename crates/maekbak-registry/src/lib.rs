//! # maekbak-registry
//!
//! 계측기 레지스트리 어댑터.
//! (이름, 종류)별 계측기 생성/조회, 태그 집합 정제, 태그 단위 누적,
//! 틱 경계의 원자적 드레인을 제공한다.
//!
//! 쓰기 경로는 lock-free(atomic) 또는 짧은 뮤텍스로 동작하고,
//! 드레인은 atomic swap으로 윈도우를 교체한다.

pub mod accumulator;
pub mod global;
pub mod instrument;
pub mod registry;

pub use instrument::{Counter, CounterHandle, Gauge, GaugeHandle, Histogram, HistogramHandle};
pub use registry::MetricRegistry;
