//! Impls - ports の in-memory 実装
//!
//! `RuntimeBuilder` は未指定の port をここの実装で埋めます。
//!
//! # 含まれる実装
//! - **AsapScheduler**: 次の tick で mount する Scheduler
//! - **InMemoryResources**: 即座に build → layout する ResourceCoordinator
//! - **InMemoryConsent**: 手動で決定を流し込む ConsentService
//! - **TracingErrorReporter** / **CollectingErrorReporter**

pub mod consent;
pub mod reporter;
pub mod resources;
pub mod scheduler;

// 主要な型を再エクスポート
pub use self::consent::InMemoryConsent;
pub use self::reporter::{CollectingErrorReporter, ReportedError, TracingErrorReporter};
pub use self::resources::InMemoryResources;
pub use self::scheduler::AsapScheduler;
