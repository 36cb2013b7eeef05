//! # maekbak-pipeline
//!
//! 주기 스냅샷 파이프라인 오케스트레이션.
//!
//! 데이터 흐름: 수집 드라이버 → 계측기 레지스트리(쓰기) →
//! 스냅샷 스케줄러(틱, 드레인) → 리포터 디스패처 → 리포터(읽기 전용).
//!
//! - [`scheduler`] — 틱 루프, 주기 스냅샷 생성
//! - [`dispatcher`] — 리포터 등록/해제, 순차 전달, 에러 격리
//! - [`collector_runner`] — 수집 드라이버 주기 실행

pub mod collector_runner;
pub mod dispatcher;
pub mod scheduler;

pub use collector_runner::CollectorRunner;
pub use dispatcher::ReporterDispatcher;
pub use scheduler::SnapshotScheduler;
