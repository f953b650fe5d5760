//! Lifecycle record - element ごとの可変状態
//!
//! Record は `Mutex` の内側にあり、ロックは `.await` をまたいで保持しません。
//! 状態遷移はすべて `Element` のメソッド経由で行われます。

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::promise::LifecyclePromise;
use crate::component::ComponentImpl;
use crate::domain::{ActionInvocation, Layout, ReadyState, UpgradeState};

/// Holds at most one installed implementation.
///
/// An element accepts exactly one install; afterwards only the upgrade
/// sequence may swap the instance (e.g. `Upgrade::Replace`).
#[derive(Default)]
pub(crate) struct ImplementationSlot {
    current: Option<Arc<dyn ComponentImpl>>,
}

impl ImplementationSlot {
    pub(crate) fn get(&self) -> Option<Arc<dyn ComponentImpl>> {
        self.current.clone()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// First install only.
    pub(crate) fn install(&mut self, implementation: Arc<dyn ComponentImpl>) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(implementation);
        true
    }

    pub(crate) fn replace(&mut self, implementation: Arc<dyn ComponentImpl>) {
        self.current = Some(implementation);
    }
}

pub(crate) struct LifecycleRecord {
    pub(crate) upgrade_state: UpgradeState,
    pub(crate) ready_state: ReadyState,
    pub(crate) built: bool,
    pub(crate) mounted: bool,
    pub(crate) connected: bool,
    pub(crate) ever_attached: bool,
    pub(crate) implementation: ImplementationSlot,

    pub(crate) build_promise: Option<LifecyclePromise>,
    pub(crate) mount_promise: Option<LifecyclePromise>,
    pub(crate) abort_handle: Option<CancellationToken>,
    /// Bumped per mount attempt so a stale attempt never clears a newer one.
    pub(crate) mount_generation: u64,

    /// `None` before first use and after the flush.
    pub(crate) action_queue: Option<VecDeque<ActionInvocation>>,

    pub(crate) layout: Layout,
    pub(crate) layout_count: u32,
    pub(crate) first_layout_completed: bool,
    pub(crate) loading_indicator: bool,
    pub(crate) upgrade_delay: Option<Duration>,
}

impl LifecycleRecord {
    pub(crate) fn new() -> Self {
        Self {
            upgrade_state: UpgradeState::NotUpgraded,
            ready_state: ReadyState::Upgrading,
            built: false,
            mounted: false,
            connected: false,
            ever_attached: false,
            implementation: ImplementationSlot::default(),
            build_promise: None,
            mount_promise: None,
            abort_handle: None,
            mount_generation: 0,
            action_queue: None,
            layout: Layout::Container,
            layout_count: 0,
            first_layout_completed: false,
            loading_indicator: false,
            upgrade_delay: None,
        }
    }

    pub(crate) fn is_r1(&self) -> bool {
        self.implementation
            .get()
            .is_some_and(|implementation| implementation.is_r1())
    }

    /// Ready state of a built element waiting for (or running) its mount.
    pub(crate) fn mounting_state(&self) -> ReadyState {
        match self.implementation.get() {
            Some(implementation) if implementation.uses_loading() => ReadyState::Loading,
            _ => ReadyState::Mounting,
        }
    }
}
