//! # maekbak-reporters
//!
//! 내장 리포터 어댑터.
//! 외부 백엔드 연동 리포터는 이 crate의 구현을 본떠
//! `maekbak_core::ports::reporter::Reporter`를 구현하면 된다.
//!
//! - [`log`] — tracing 로그 출력
//! - [`broadcast`] — tokio broadcast 채널 팬아웃
//! - [`memory`] — 최근 스냅샷 인메모리 보관 (테스트/진단용)

pub mod broadcast;
pub mod log;
pub mod memory;

pub use broadcast::BroadcastReporter;
pub use log::LogReporter;
pub use memory::MemoryReporter;
