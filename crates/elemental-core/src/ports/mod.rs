//! Ports - 外部コラボレーターの抽象化レイヤー
//!
//! Lifecycle controller が依存する外部サービスをすべて trait として定義します。
//! 開発・テスト用の実装は `impls` にあります。

pub mod clock;
pub mod consent;
pub mod error_reporter;
pub mod id_generator;
pub mod resources;
pub mod scheduler;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::consent::ConsentService;
pub use self::error_reporter::ErrorReporter;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::resources::{LayoutRect, ResourceCoordinator, ResourceState};
pub use self::scheduler::{Scheduler, ScrollerHint};
