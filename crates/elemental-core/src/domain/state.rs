//! State - element の upgrade / ready 状態
//!
//! # 状態遷移
//! - UpgradeState: NotUpgraded -> UpgradingInProgress -> Upgraded | UpgradeFailed
//! - ReadyState:   Upgrading -> Building -> Mounting -> Loading -> Complete
//!   （Building/Mounting/Loading からは Error にも遷移する）

use serde::{Deserialize, Serialize};

/// Upgrade progress of an element.
///
/// `Upgraded` and `UpgradeFailed` are terminal: no further upgrade attempt is
/// made once either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradeState {
    NotUpgraded,
    UpgradingInProgress,
    Upgraded,
    UpgradeFailed,
}

impl UpgradeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, UpgradeState::Upgraded | UpgradeState::UpgradeFailed)
    }
}

/// Externally observable readiness of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadyState {
    /// Waiting for the implementation to be installed and upgraded.
    Upgrading,

    /// Build in progress (or waiting for consent).
    Building,

    /// Built, waiting for (or running) the mount/layout step.
    Mounting,

    /// Mounted, content still loading.
    Loading,

    /// Fully loaded.
    Complete,

    /// Build, mount or layout failed.
    Error,
}

impl ReadyState {
    /// Complete and Error end a cycle; unmount/unlayout start a new one.
    pub fn is_settled(self) -> bool {
        matches!(self, ReadyState::Complete | ReadyState::Error)
    }
}
