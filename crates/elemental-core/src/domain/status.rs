//! Status - element の状態スナップショット
//!
//! CLI やテストから「いまどこで止まっているか」を説明するためのビュー。

use serde::{Deserialize, Serialize};

use super::ids::ElementId;
use super::layout::Layout;
use super::state::{ReadyState, UpgradeState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStatus {
    pub id: ElementId,
    pub tag: String,
    pub upgrade_state: UpgradeState,
    pub ready_state: ReadyState,
    pub built: bool,
    pub mounted: bool,
    pub connected: bool,
    pub layout: Layout,
    pub layout_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_delay_ms: Option<u64>,

    /// Signals that have settled successfully, in no particular order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
}

/// Aggregate counts over many elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyCounts {
    pub upgrading: usize,
    pub building: usize,
    pub mounting: usize,
    pub loading: usize,
    pub complete: usize,
    pub error: usize,
}

impl ReadyCounts {
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a ElementStatus>) -> Self {
        let mut counts = ReadyCounts::default();
        for status in statuses {
            match status.ready_state {
                ReadyState::Upgrading => counts.upgrading += 1,
                ReadyState::Building => counts.building += 1,
                ReadyState::Mounting => counts.mounting += 1,
                ReadyState::Loading => counts.loading += 1,
                ReadyState::Complete => counts.complete += 1,
                ReadyState::Error => counts.error += 1,
            }
        }
        counts
    }
}
