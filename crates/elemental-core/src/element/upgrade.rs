//! Upgrade - 実装の設置と upgrade の完了
//!
//! # 状態遷移
//! NotUpgraded → UpgradingInProgress → Upgraded / UpgradeFailed
//!
//! Upgraded と UpgradeFailed は終端です。以後 upgrade は試みません。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::Element;
use crate::component::{ComponentImpl, Upgrade};
use crate::domain::{CommonSignal, LifecycleError, ReadyState, UpgradeState};

impl Element {
    /// Installs the implementation.
    ///
    /// Accepted once, while the element is still NotUpgraded. When the element
    /// has already been attached the upgrade completes immediately; otherwise
    /// it waits for the first connection. Returns whether it was accepted.
    pub fn upgrade(&self, implementation: Arc<dyn ComponentImpl>) -> bool {
        let attached = {
            let mut record = self.record();
            if record.upgrade_state != UpgradeState::NotUpgraded
                || !record.implementation.install(implementation)
            {
                debug!(element = %self.id(), tag = self.tag(), "implementation already installed; upgrade ignored");
                return false;
            }
            record.ever_attached
        };
        self.signals().signal(CommonSignal::ReadyToUpgrade);
        if attached {
            self.upgrade_or_schedule(false);
        }
        true
    }

    /// Runs the implementation's upgrade hook, once.
    pub fn try_upgrade(&self) {
        let implementation = {
            let mut record = self.record();
            if record.upgrade_state != UpgradeState::NotUpgraded {
                return;
            }
            let Some(implementation) = record.implementation.get() else {
                return;
            };
            record.upgrade_state = UpgradeState::UpgradingInProgress;
            implementation
        };
        let started = self.host().clock.now();

        match implementation.upgrade_callback() {
            Upgrade::Ready => self.complete_upgrade(implementation, started),
            Upgrade::Replace(replacement) => self.complete_upgrade(replacement, started),
            Upgrade::Deferred(pending) => {
                debug!(element = %self.id(), tag = self.tag(), "upgrade deferred");
                let element = self.clone();
                tokio::spawn(async move {
                    match pending.await {
                        Ok(replacement) => {
                            element.complete_upgrade(replacement.unwrap_or(implementation), started)
                        }
                        Err(err) => element.fail_upgrade(err),
                    }
                });
            }
        }
    }

    fn complete_upgrade(&self, implementation: Arc<dyn ComponentImpl>, started: DateTime<Utc>) {
        let layout = self.layout();
        if !implementation.is_layout_supported(layout) {
            self.fail_upgrade(LifecycleError::LayoutNotSupported { layout });
            return;
        }
        let delay = (self.host().clock.now() - started)
            .to_std()
            .unwrap_or_default();
        let (r1, built) = {
            let mut record = self.record();
            record.implementation.replace(Arc::clone(&implementation));
            record.upgrade_delay = Some(delay);
            record.upgrade_state = UpgradeState::Upgraded;
            (implementation.is_r1(), record.built)
        };
        if !built {
            self.set_ready_state_internal(ReadyState::Building, None);
        }
        info!(
            element = %self.id(),
            tag = self.tag(),
            r1,
            delay_ms = delay.as_millis() as u64,
            "element upgraded"
        );
        if !r1 {
            self.document().resources.upgraded(self);
        }
        self.signals().signal(CommonSignal::Upgraded);
    }

    fn fail_upgrade(&self, err: LifecycleError) {
        self.record().upgrade_state = UpgradeState::UpgradeFailed;
        self.signals().reject_signal(CommonSignal::Upgraded, err.clone());
        self.report(&err);
    }

    /// Upgrades if possible, then (R1 only) asks the scheduler for a mount.
    pub(crate) fn upgrade_or_schedule(&self, disable_preload: bool) {
        self.try_upgrade();

        let (implementation, state) = {
            let record = self.record();
            let Some(implementation) = record.implementation.get() else {
                return;
            };
            if !implementation.is_r1() || record.mount_promise.is_some() {
                return;
            }
            let state = if record.built {
                record.mounting_state()
            } else {
                ReadyState::Building
            };
            (implementation, state)
        };
        self.set_ready_state_internal(state, None);

        let scheduler = Arc::clone(&self.document().scheduler);
        if implementation.deferred_mount() {
            scheduler.schedule(self);
        } else {
            scheduler.schedule_asap(self);
        }
        if !disable_preload && self.host().config.early_preconnect {
            implementation.preconnect_callback(false);
        }
    }
}
