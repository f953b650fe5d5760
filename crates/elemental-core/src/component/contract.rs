//! ComponentImpl - element に差し込まれる実装の契約
//!
//! # 学習ポイント
//! - Object-safe な async trait（`Arc<dyn ComponentImpl>` で保持）
//! - デフォルト実装付きの capability flag
//! - upgrade hook の三通りの戻り値を enum で表現

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::domain::{ActionInvocation, Layout, LifecycleError};

/// Result of [`ComponentImpl::upgrade_callback`].
pub enum Upgrade {
    /// The current instance is the upgraded implementation.
    Ready,

    /// Replace the current instance with another one.
    Replace(Arc<dyn ComponentImpl>),

    /// Upgrade asynchronously. `Ok(None)` keeps the current instance.
    Deferred(BoxFuture<'static, Result<Option<Arc<dyn ComponentImpl>>, LifecycleError>>),
}

/// The pluggable implementation behind an element.
///
/// Every hook has a default so implementations only override what they use.
/// Hooks are invoked by the lifecycle controller only; an implementation never
/// drives its own lifecycle.
#[async_trait]
pub trait ComponentImpl: Send + Sync {
    // ---- capability flags ----

    /// Mount/load decisions are made by the Scheduler instead of the
    /// Resource Coordinator.
    fn is_r1(&self) -> bool {
        false
    }

    /// The element reports completion itself after mounting (via
    /// `Element::set_ready_state`).
    fn uses_loading(&self) -> bool {
        false
    }

    /// Mount only when the scheduler decides so; otherwise mount ASAP.
    fn deferred_mount(&self) -> bool {
        true
    }

    fn is_always_fixed(&self) -> bool {
        false
    }

    fn prerender_allowed(&self) -> bool {
        false
    }

    fn is_layout_supported(&self, _layout: Layout) -> bool {
        true
    }

    // ---- upgrade ----

    fn upgrade_callback(&self) -> Upgrade {
        Upgrade::Ready
    }

    // ---- lifecycle hooks ----

    async fn build_callback(&self) -> Result<(), LifecycleError> {
        Ok(())
    }

    async fn mount_callback(&self, _signal: &CancellationToken) -> Result<(), LifecycleError> {
        Ok(())
    }

    fn unmount_callback(&self) {}

    async fn layout_callback(&self, _signal: &CancellationToken) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Returns whether a relayout is needed on the next layout request.
    fn unlayout_callback(&self) -> bool {
        false
    }

    fn first_layout_completed(&self) {}

    fn pause_callback(&self) {}

    fn resume_callback(&self) {}

    fn attached_callback(&self) {}

    fn detached_callback(&self) {}

    fn preconnect_callback(&self, _on_layout: bool) {}

    /// Returns the tag of a placeholder to insert, if any.
    fn create_placeholder_callback(&self) -> Option<String> {
        None
    }

    fn execute_action(
        &self,
        _invocation: &ActionInvocation,
        _deferred: bool,
    ) -> Result<(), LifecycleError> {
        Ok(())
    }

    // ---- metadata ----

    fn consent_policy(&self) -> Option<String> {
        None
    }

    fn purposes_consent(&self) -> Option<Vec<String>> {
        None
    }

    fn reconstruct_when_reparented(&self) -> bool {
        true
    }

    /// Legacy only: unlayout instead of just pausing.
    fn unlayout_on_pause(&self) -> bool {
        false
    }

    fn layout_priority(&self) -> u32 {
        0
    }
}
