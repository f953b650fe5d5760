//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock の時刻 + 乱数）

use std::sync::Arc;

use crate::domain::ids::{ElementId, MountId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は element / mount attempt の ID を生成
pub trait IdGenerator: Send + Sync {
    fn generate_element_id(&self) -> ElementId;

    fn generate_mount_id(&self) -> MountId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テスト時に FixedClock を使うと timestamp 部分が決定的になります。
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn next(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_element_id(&self) -> ElementId {
        ElementId::from(self.next())
    }

    fn generate_mount_id(&self) -> MountId {
        MountId::from(self.next())
    }
}
