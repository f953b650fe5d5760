//! Build - 一度きりの初期化と action queue
//!
//! # 学習ポイント
//! - `build()` は shared future をキャッシュして要求をまとめる
//! - build は取り消せない（mount と違い token を持たない）
//! - consent block は想定内の結果: 報告せず、キャッシュを捨てて次の build で再評価
//!
//! # 順序
//! 1. READY_TO_UPGRADE を待つ
//! 2. upgrade がまだなら完了させる
//! 3. consent gate
//! 4. `build_callback()`
//! 5. BUILT → ready state → attached → action queue の flush

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info};

use super::Element;
use super::promise::{LifecyclePromise, LifecycleResult};
use crate::component::ComponentImpl;
use crate::domain::{
    ActionInvocation, CommonSignal, ErrorKind, LifecycleError, ReadyState, UpgradeState,
};

impl Element {
    /// Builds the element, once. Concurrent callers share the same promise.
    pub fn build(&self) -> LifecyclePromise {
        let promise = {
            let mut record = self.record();
            if let Some(promise) = &record.build_promise {
                return promise.clone();
            }
            let element = self.clone();
            let promise = LifecyclePromise::new(async move { element.run_build().await });
            record.build_promise = Some(promise.clone());
            promise
        };
        debug!(element = %self.id(), tag = self.tag(), "build requested");
        self.set_ready_state_internal(ReadyState::Building, None);
        promise.detach();
        promise
    }

    async fn run_build(self) -> LifecycleResult {
        match self.build_steps().await {
            Ok(()) => {
                self.on_built();
                Ok(())
            }
            Err(err) => {
                self.on_build_failed(&err);
                Err(err)
            }
        }
    }

    async fn build_steps(&self) -> LifecycleResult {
        self.signals()
            .when_signal(CommonSignal::ReadyToUpgrade)
            .await?;
        let implementation = self.ensure_upgraded().await?;
        self.consent_gate(implementation.as_ref()).await?;
        implementation.build_callback().await
    }

    /// Completes a pending upgrade and returns the upgraded implementation.
    async fn ensure_upgraded(&self) -> Result<Arc<dyn ComponentImpl>, LifecycleError> {
        self.try_upgrade();
        if self.upgrade_state() == UpgradeState::NotUpgraded {
            return Err(LifecycleError::UpgradeFailed(
                "no implementation installed".into(),
            ));
        }
        self.when_upgraded().await.map_err(|err| match err.kind() {
            ErrorKind::Upgrade => err,
            _ => LifecycleError::UpgradeFailed(err.to_string()),
        })?;
        self.implementation()
            .ok_or_else(|| LifecycleError::UpgradeFailed("implementation missing".into()))
    }

    fn on_built(&self) {
        let (implementation, connected, queued) = {
            let mut record = self.record();
            record.built = true;
            (
                record.implementation.get(),
                record.connected,
                record.action_queue.take(),
            )
        };
        let Some(implementation) = implementation else {
            return;
        };
        info!(element = %self.id(), tag = self.tag(), "element built");
        self.signals().signal(CommonSignal::Built);

        let r1 = implementation.is_r1();
        if r1 {
            if self.ready_state() == ReadyState::Building {
                self.set_ready_state_internal(ReadyState::Mounting, None);
            }
        } else {
            self.set_ready_state_internal(ReadyState::Loading, None);
        }

        if connected {
            implementation.attached_callback();
        }

        for invocation in queued.into_iter().flatten() {
            self.execute_action(implementation.as_ref(), &invocation, true);
        }

        if !r1 {
            let config = &self.host().config;
            if config.early_preconnect {
                let delay = config.preconnect_delay();
                let implementation = Arc::clone(&implementation);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    implementation.preconnect_callback(false);
                });
            }
            if config.create_placeholders && self.node().placeholder().is_none() {
                if let Some(placeholder) = implementation.create_placeholder_callback() {
                    self.node().insert_placeholder(placeholder);
                }
            }
        }
    }

    fn on_build_failed(&self, err: &LifecycleError) {
        self.signals()
            .reject_signal(CommonSignal::Built, err.clone());
        if err.is_blocked_by_consent() {
            info!(element = %self.id(), tag = self.tag(), error = %err, "build blocked by consent");
            self.signals().reset(CommonSignal::Built);
            self.record().build_promise = None;
            return;
        }
        self.set_ready_state_internal(ReadyState::Error, Some(err.clone()));
        // Upgrade failures were reported when the upgrade settled.
        if err.kind() != ErrorKind::Upgrade {
            self.report(err);
        }
    }

    /// Runs the action now when built, otherwise queues it until the build
    /// completes.
    pub fn enqueue_action(&self, invocation: ActionInvocation) {
        let implementation = {
            let mut record = self.record();
            if !record.built {
                debug!(element = %self.id(), tag = self.tag(), method = %invocation.method, "action queued until built");
                record
                    .action_queue
                    .get_or_insert_with(VecDeque::new)
                    .push_back(invocation);
                return;
            }
            record.implementation.get()
        };
        if let Some(implementation) = implementation {
            self.execute_action(implementation.as_ref(), &invocation, false);
        }
    }

    /// Number of actions waiting for the build.
    pub fn queued_actions(&self) -> usize {
        self.record().action_queue.as_ref().map_or(0, VecDeque::len)
    }

    fn execute_action(
        &self,
        implementation: &dyn ComponentImpl,
        invocation: &ActionInvocation,
        deferred: bool,
    ) {
        if let Err(err) = implementation.execute_action(invocation, deferred) {
            let err = match err {
                err @ LifecycleError::ActionFailed { .. } => err,
                other => LifecycleError::ActionFailed {
                    method: invocation.method.clone(),
                    reason: other.to_string(),
                },
            };
            self.report(&err);
        }
    }
}
