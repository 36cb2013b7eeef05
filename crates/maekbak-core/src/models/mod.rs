//! MAEKBAK 도메인 모델.
//!
//! 파이프라인 전 구간이 공유하는 핵심 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod metric;
pub mod snapshot;
