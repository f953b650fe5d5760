//! Mount / unmount - R1 パス
//!
//! # 学習ポイント
//! - mount ごとに新しい `CancellationToken` を作る（abort handle）
//! - hook の future を `tokio::select!` で token と競争させる
//! - mount generation で古い試行が新しい試行の状態を消さないようにする
//!
//! unmount は同期的に完了します。走行中の mount は token の取り消しで
//! `LifecycleError::Cancelled` として settle し、COMPLETE にも ERROR にもなりません。

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Element;
use super::promise::{LifecyclePromise, LifecycleResult};
use crate::domain::{CommonSignal, LifecycleError, MountId, ReadyState, UpgradeState};
use crate::ports::ScrollerHint;

impl Element {
    /// Mounts the element, once per mount cycle.
    ///
    /// Legacy elements resolve as soon as they are built.
    pub fn mount(&self) -> LifecyclePromise {
        let mount_id = self.host().ids.generate_mount_id();
        let (promise, generation) = {
            let mut record = self.record();
            if let Some(promise) = &record.mount_promise {
                return promise.clone();
            }
            record.mount_generation += 1;
            let generation = record.mount_generation;
            let token = CancellationToken::new();
            record.abort_handle = Some(token.clone());

            let element = self.clone();
            let promise = LifecyclePromise::new(async move {
                element.run_mount(token, generation, mount_id).await
            });
            record.mount_promise = Some(promise.clone());
            (promise, generation)
        };
        debug!(element = %self.id(), tag = self.tag(), mount = %mount_id, generation, "mount requested");
        promise.detach();
        promise
    }

    async fn run_mount(self, token: CancellationToken, generation: u64, mount_id: MountId) -> LifecycleResult {
        let result = self.mount_steps(&token).await;
        self.finish_mount(generation, mount_id, &result);
        result
    }

    async fn mount_steps(&self, token: &CancellationToken) -> LifecycleResult {
        let build = self.build();
        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(LifecycleError::Cancelled),
            built = build => built?,
        }

        let implementation = match self.implementation() {
            Some(implementation) if implementation.is_r1() => implementation,
            _ => return Ok(()),
        };
        if token.is_cancelled() {
            return Err(LifecycleError::Cancelled);
        }

        let state = {
            let mut record = self.record();
            record.mounted = true;
            record.mounting_state()
        };
        self.set_ready_state_internal(state, None);

        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(LifecycleError::Cancelled),
            mounted = implementation.mount_callback(token) => mounted?,
        }
        if token.is_cancelled() {
            return Err(LifecycleError::Cancelled);
        }

        self.signals().signal(CommonSignal::Mounted);
        if !implementation.uses_loading() {
            self.set_ready_state_internal(ReadyState::Complete, None);
        }
        Ok(())
    }

    fn finish_mount(&self, generation: u64, mount_id: MountId, result: &LifecycleResult) {
        let current = {
            let mut record = self.record();
            let current = record.mount_generation == generation;
            if current {
                record.abort_handle = None;
                if result.as_ref().is_err_and(LifecycleError::is_expected) {
                    record.mount_promise = None;
                }
            }
            current
        };
        match result {
            Ok(()) => {
                info!(element = %self.id(), tag = self.tag(), mount = %mount_id, "element mounted");
            }
            Err(err) if err.is_expected() => {
                debug!(element = %self.id(), tag = self.tag(), mount = %mount_id, error = %err, "mount did not complete");
            }
            Err(err) => {
                if !current {
                    return;
                }
                self.signals()
                    .reject_signal(CommonSignal::Mounted, err.clone());
                // Build failures already set ERROR and were reported.
                if self.is_built() {
                    self.set_ready_state_internal(ReadyState::Error, Some(err.clone()));
                    self.report(err);
                }
            }
        }
    }

    /// Tears the current mount cycle down. Completes synchronously, even
    /// while a mount hook is still pending.
    pub fn unmount(&self) {
        let (implementation, connected) = {
            let record = self.record();
            (record.implementation.get(), record.connected)
        };
        if connected {
            self.pause();
        }
        let Some(implementation) = implementation else {
            return;
        };

        if !implementation.is_r1() {
            let relayout = self.unlayout_callback();
            if relayout && connected {
                self.document().resources.request_measure(self);
            }
            return;
        }

        let token = self.record().abort_handle.take();
        if let Some(token) = token {
            token.cancel();
        }
        self.document().scheduler.unschedule(self);

        let was_mounted = self.record().mounted;
        if was_mounted {
            implementation.unmount_callback();
        }
        {
            let mut record = self.record();
            record.mounted = false;
            record.mount_promise = None;
            record.ready_state = if record.built {
                record.mounting_state()
            } else if record.upgrade_state == UpgradeState::Upgraded {
                ReadyState::Building
            } else {
                record.ready_state
            };
        }
        self.reset_cycle(true);
        debug!(element = %self.id(), tag = self.tag(), was_mounted, "element unmounted");

        if connected {
            self.upgrade_or_schedule(true);
        }
    }

    /// Marks the element as a scroll container for the scheduler.
    pub fn set_as_container(&self, scroller: Option<ScrollerHint>) {
        self.document().scheduler.set_container(self, scroller);
    }

    pub fn remove_as_container(&self) {
        self.document().scheduler.remove_container(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::test_support::{Harness, Hook, Script};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn mount_builds_first_then_completes() {
        let harness = Harness::new();
        let (element, component) = harness.element(Script::r1());
        harness.connect(&element);

        element.mount().await.unwrap();
        assert!(element.is_built());
        assert!(element.is_mounted());
        assert_eq!(element.ready_state(), ReadyState::Complete);
        assert_eq!(component.calls().iter().filter(|c| *c == "build" || *c == "mount").cloned().collect::<Vec<_>>(), vec!["build", "mount"]);
        assert!(element.signals().get(CommonSignal::Mounted).unwrap().is_ok());
        assert!(element.signals().get(CommonSignal::LoadEnd).unwrap().is_ok());
    }

    #[tokio::test]
    async fn complete_never_precedes_build() {
        let gate = Arc::new(Notify::new());
        let mut script = Script::r1();
        script.build = Hook::Gate(gate.clone());
        let harness = Harness::new();
        let (element, component) = harness.element(script);
        harness.connect(&element);

        let mount = element.mount();
        harness.settle().await;
        assert_eq!(mount.peek(), None);
        assert_ne!(element.ready_state(), ReadyState::Complete);
        assert!(!component.called("mount"));

        gate.notify_one();
        mount.await.unwrap();
        assert_eq!(element.ready_state(), ReadyState::Complete);
    }

    #[tokio::test]
    async fn concurrent_mounts_share_one_promise() {
        let harness = Harness::new();
        let (element, component) = harness.element(Script::r1());
        harness.connect(&element);

        let first = element.mount();
        assert!(first.ptr_eq(&element.mount()));
        first.await.unwrap();
        element.mount().await.unwrap();
        assert_eq!(component.count("mount"), 1);
    }

    #[tokio::test]
    async fn uses_loading_waits_for_the_element() {
        let mut script = Script::r1();
        script.uses_loading = true;
        let harness = Harness::new();
        let (element, _component) = harness.element(script);
        harness.connect(&element);

        element.mount().await.unwrap();
        assert_eq!(element.ready_state(), ReadyState::Loading);
        assert!(element.signals().get(CommonSignal::LoadStart).unwrap().is_ok());
        assert_eq!(element.signals().get(CommonSignal::LoadEnd), None);

        element.render_started();
        element.set_ready_state(ReadyState::Complete);
        assert!(element.signals().get(CommonSignal::RenderStart).is_some());
        assert!(element.signals().get(CommonSignal::LoadEnd).unwrap().is_ok());
    }

    #[tokio::test]
    async fn unmount_cancels_a_pending_mount_synchronously() {
        let mut script = Script::r1();
        script.mount = Hook::Pending;
        let harness = Harness::new();
        let (element, component) = harness.element(script);
        harness.connect(&element);

        let mount = element.mount();
        harness.settle().await;
        assert!(component.called("mount"));
        assert!(element.is_mounted());

        element.unmount();
        assert!(!element.is_mounted());
        assert!(component.called("unmount"));

        let outcome = tokio::time::timeout(Duration::from_secs(1), mount)
            .await
            .expect("cancelled mount settles");
        assert_eq!(outcome, Err(LifecycleError::Cancelled));
        assert_ne!(element.ready_state(), ReadyState::Complete);
        assert_ne!(element.ready_state(), ReadyState::Error);
        assert_eq!(element.signals().get(CommonSignal::Mounted), None);
        assert!(harness.reporter.is_empty());
        assert!(harness.scheduler.calls_for(&element).contains(&"unschedule"));
    }

    #[tokio::test]
    async fn unmount_then_mount_starts_a_fresh_cycle() {
        let harness = Harness::new();
        let (element, component) = harness.element(Script::r1());
        harness.connect(&element);

        let first = element.mount();
        first.clone().await.unwrap();
        assert_eq!(element.ready_state(), ReadyState::Complete);

        element.unmount();
        assert_eq!(element.ready_state(), ReadyState::Mounting);
        assert_eq!(element.signals().get(CommonSignal::Mounted), None);
        assert_eq!(element.signals().get(CommonSignal::LoadEnd), None);

        let second = element.mount();
        assert!(!first.ptr_eq(&second));
        second.await.unwrap();
        assert_eq!(element.ready_state(), ReadyState::Complete);
        assert_eq!(component.count("mount"), 2);
        assert_eq!(component.count("build"), 1);
        assert_eq!(component.count("unmount"), 1);
    }

    #[tokio::test]
    async fn stale_cancellation_keeps_the_new_mount() {
        let gate = Arc::new(Notify::new());
        let mut script = Script::r1();
        script.mount = Hook::Gate(gate.clone());
        let harness = Harness::new();
        let (element, _component) = harness.element(script);
        harness.connect(&element);

        let first = element.mount();
        harness.settle().await;
        element.unmount();
        let second = element.mount();

        assert_eq!(first.await, Err(LifecycleError::Cancelled));
        assert!(element.mount().ptr_eq(&second));

        gate.notify_one();
        second.await.unwrap();
        assert!(element.is_mounted());
    }

    #[tokio::test]
    async fn failed_mount_sets_error() {
        let mut script = Script::r1();
        script.mount = Hook::Fail("decode error".into());
        let harness = Harness::new();
        let (element, _component) = harness.element(script);
        harness.connect(&element);

        let err = LifecycleError::component("decode error");
        assert_eq!(element.mount().await, Err(err.clone()));
        assert_eq!(element.ready_state(), ReadyState::Error);
        assert_eq!(element.signals().get(CommonSignal::Mounted), Some(Err(err.clone())));
        assert_eq!(harness.reporter.errors(), vec![err]);
    }

    #[tokio::test]
    async fn unmount_without_mount_skips_the_hook() {
        let harness = Harness::new();
        let (element, component) = harness.element(Script::r1());
        harness.connect(&element);
        element.build().await.unwrap();

        element.unmount();
        assert!(!component.called("unmount"));
        assert!(component.called("pause"));
        assert_eq!(
            harness.scheduler.calls_for(&element),
            vec!["schedule", "unschedule", "schedule"]
        );
    }

    #[tokio::test]
    async fn legacy_mount_resolves_once_built() {
        let harness = Harness::new();
        let (element, component) = harness.element(Script::legacy());
        harness.connect(&element);

        element.mount().await.unwrap();
        assert!(element.is_built());
        assert!(!element.is_mounted());
        assert!(!component.called("mount"));
    }
}
