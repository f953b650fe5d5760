//! Element - lifecycle controller
//!
//! `Element` は cheap に clone できるハンドルで、内部に
//! - プレーンなデータノード（`ElementNode`）
//! - signal board
//! - lifecycle record（upgrade / ready 状態、キャッシュされた promise、abort handle）
//!
//! を持ちます。ホストの custom element はネイティブの callback をそのまま
//! `Element` に転送するだけです。
//!
//! # モジュール構成
//! - **upgrade**: upgrade / try_upgrade
//! - **build**: build と action queue
//! - **consent**: build 内の consent gate
//! - **mount**: R1 パスの mount / unmount
//! - **layout**: legacy パスの layout / unlayout と pause / resume
//! - **connection**: DOM 接続 / 切断

mod build;
mod connection;
mod consent;
mod layout;
mod mount;
pub mod node;
pub mod promise;
mod record;
mod upgrade;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use std::time::Duration;

use tracing::debug;

use self::record::LifecycleRecord;
use crate::app::document::DocumentContext;
use crate::app::runtime::Host;
use crate::component::ComponentImpl;
use crate::domain::{
    CommonSignal, ElementId, ElementStatus, Layout, LifecycleError, ReadyState, UpgradeState,
};
use crate::signals::{SignalBoard, SignalOutcome};

pub use self::node::ElementNode;
pub use self::promise::{LifecyclePromise, LifecycleResult};

/// Handle to one element record and its lifecycle controller.
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementInner>,
}

/// Non-owning handle, held by implementations and collaborators that must not
/// keep the element alive.
#[derive(Clone, Default)]
pub struct WeakElement {
    inner: Weak<ElementInner>,
}

struct ElementInner {
    id: ElementId,
    node: ElementNode,
    signals: SignalBoard,
    host: Arc<Host>,
    document: OnceLock<Arc<DocumentContext>>,
    record: Mutex<LifecycleRecord>,
}

impl Element {
    pub(crate) fn new(host: Arc<Host>, node: ElementNode) -> Self {
        let id = host.ids.generate_element_id();
        let signals = SignalBoard::new(Arc::clone(&host.clock));
        Self {
            inner: Arc::new(ElementInner {
                id,
                node,
                signals,
                host,
                document: OnceLock::new(),
                record: Mutex::new(LifecycleRecord::new()),
            }),
        }
    }

    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    pub fn tag(&self) -> &str {
        self.inner.node.tag()
    }

    pub fn node(&self) -> &ElementNode {
        &self.inner.node
    }

    pub fn signals(&self) -> &SignalBoard {
        &self.inner.signals
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn record(&self) -> MutexGuard<'_, LifecycleRecord> {
        self.inner.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn host(&self) -> &Arc<Host> {
        &self.inner.host
    }

    /// Document context, resolved on first use (normally the first
    /// connection).
    pub(crate) fn document(&self) -> Arc<DocumentContext> {
        Arc::clone(
            self.inner
                .document
                .get_or_init(|| self.inner.host.document_for(&self.inner.node)),
        )
    }

    pub fn implementation(&self) -> Option<Arc<dyn ComponentImpl>> {
        self.record().implementation.get()
    }

    // ---- state queries ----

    pub fn upgrade_state(&self) -> UpgradeState {
        self.record().upgrade_state
    }

    pub fn ready_state(&self) -> ReadyState {
        self.record().ready_state
    }

    pub fn is_upgraded(&self) -> bool {
        self.upgrade_state() == UpgradeState::Upgraded
    }

    pub fn is_built(&self) -> bool {
        self.record().built
    }

    pub fn is_mounted(&self) -> bool {
        self.record().mounted
    }

    pub fn is_connected(&self) -> bool {
        self.record().connected
    }

    pub fn is_r1(&self) -> bool {
        self.record().is_r1()
    }

    pub fn layout(&self) -> Layout {
        self.record().layout
    }

    /// Completed legacy layouts in the current cycle, failures included.
    pub fn layout_count(&self) -> u32 {
        self.record().layout_count
    }

    pub fn is_loading_shown(&self) -> bool {
        self.record().loading_indicator
    }

    /// Wall-clock time spent in the upgrade hook.
    pub fn upgrade_delay(&self) -> Option<Duration> {
        self.record().upgrade_delay
    }

    pub fn status(&self) -> ElementStatus {
        let record = self.record();
        ElementStatus {
            id: self.id(),
            tag: self.tag().to_string(),
            upgrade_state: record.upgrade_state,
            ready_state: record.ready_state,
            built: record.built,
            mounted: record.mounted,
            connected: record.connected,
            layout: record.layout,
            layout_count: record.layout_count,
            upgrade_delay_ms: record.upgrade_delay.map(|d| d.as_millis() as u64),
            signals: self.signals().resolved(),
        }
    }

    pub fn when_built(&self) -> impl Future<Output = SignalOutcome> + Send + 'static {
        self.signals().when_signal(CommonSignal::Built)
    }

    pub fn when_upgraded(&self) -> impl Future<Output = SignalOutcome> + Send + 'static {
        self.signals().when_signal(CommonSignal::Upgraded)
    }

    /// The implementation, once the element has been built.
    pub async fn get_impl(&self) -> Result<Arc<dyn ComponentImpl>, LifecycleError> {
        self.when_built().await?;
        self.implementation().ok_or(LifecycleError::NotBuilt)
    }

    // ---- hooks for implementations ----

    /// Lets an implementation that `uses_loading()` report its progress.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.set_ready_state_internal(state, None);
    }

    pub fn render_started(&self) {
        self.signals().signal(CommonSignal::RenderStart);
        self.record().loading_indicator = false;
    }

    pub(crate) fn set_ready_state_internal(&self, state: ReadyState, reason: Option<LifecycleError>) {
        let r1 = {
            let mut record = self.record();
            if record.ready_state == state {
                return;
            }
            record.ready_state = state;
            if state.is_settled() {
                record.loading_indicator = false;
            }
            record.is_r1()
        };
        debug!(element = %self.id(), tag = self.tag(), ready_state = ?state, "ready state changed");
        if !r1 {
            return;
        }
        let signals = self.signals();
        match state {
            ReadyState::Loading => {
                signals.signal(CommonSignal::LoadStart);
                signals.reset(CommonSignal::LoadEnd);
                signals.reset(CommonSignal::Unload);
            }
            ReadyState::Complete => {
                signals.signal(CommonSignal::LoadStart);
                signals.signal(CommonSignal::LoadEnd);
                signals.signal(CommonSignal::IniLoad);
            }
            ReadyState::Error => {
                let reason =
                    reason.unwrap_or_else(|| LifecycleError::component("element reported an error"));
                signals.reject_signal(CommonSignal::LoadEnd, reason);
            }
            _ => {}
        }
    }

    /// Starts a fresh mount/layout cycle: counters and cycle signals.
    pub(crate) fn reset_cycle(&self, include_mounted: bool) {
        self.record().layout_count = 0;
        let signals = self.signals();
        if include_mounted {
            signals.reset(CommonSignal::Mounted);
        }
        for signal in CommonSignal::CYCLE {
            signals.reset(signal);
        }
    }

    /// Hands an unexpected error to the process-wide reporter.
    pub(crate) fn report(&self, err: &LifecycleError) {
        if err.is_expected() {
            return;
        }
        self.host().reporter.report(self.id(), self.tag(), err);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        f.debug_struct("Element")
            .field("id", &self.id())
            .field("tag", &self.tag())
            .field("upgrade_state", &record.upgrade_state)
            .field("ready_state", &record.ready_state)
            .field("built", &record.built)
            .field("mounted", &record.mounted)
            .field("connected", &record.connected)
            .finish()
    }
}

impl WeakElement {
    /// A handle that never upgrades.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<Element> {
        self.inner.upgrade().map(|inner| Element { inner })
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakElement")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
