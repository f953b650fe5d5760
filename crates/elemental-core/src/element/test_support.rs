//! テスト用の scripted component と記録係の collaborator

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::FutureExt;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::Element;
use crate::app::{Runtime, RuntimeConfig};
use crate::component::{ComponentImpl, Upgrade};
use crate::domain::{ActionInvocation, ElementId, Layout, LifecycleError};
use crate::impls::{CollectingErrorReporter, InMemoryConsent};
use crate::ports::{
    FixedClock, LayoutRect, ResourceCoordinator, ResourceState, Scheduler, ScrollerHint,
};

/// Behaviour of an async hook.
#[derive(Clone)]
pub(crate) enum Hook {
    Ok,
    Fail(String),
    Pending,
    /// Completes once the notify fires.
    Gate(Arc<Notify>),
}

impl Hook {
    async fn run(&self) -> Result<(), LifecycleError> {
        match self {
            Hook::Ok => Ok(()),
            Hook::Fail(message) => Err(LifecycleError::component(message.clone())),
            Hook::Pending => std::future::pending().await,
            Hook::Gate(notify) => {
                notify.notified().await;
                Ok(())
            }
        }
    }
}

#[derive(Clone)]
pub(crate) enum UpgradeHook {
    Ready,
    Replace(Arc<dyn ComponentImpl>),
    Deferred(Hook),
}

#[derive(Clone)]
pub(crate) struct Script {
    pub r1: bool,
    pub uses_loading: bool,
    pub deferred_mount: bool,
    pub reconstruct: bool,
    pub unlayout_on_pause: bool,
    pub relayout: bool,
    pub upgrade: UpgradeHook,
    pub build: Hook,
    pub mount: Hook,
    pub layout: Hook,
    /// Layouts after this many calls fail.
    pub fail_layout_after: Option<usize>,
    pub consent_policy: Option<String>,
    pub purposes: Option<Vec<String>>,
    pub supported_layouts: Option<Vec<Layout>>,
    pub placeholder: Option<String>,
    pub fail_actions: bool,
}

impl Script {
    pub(crate) fn r1() -> Self {
        Self {
            r1: true,
            uses_loading: false,
            deferred_mount: true,
            reconstruct: true,
            unlayout_on_pause: false,
            relayout: false,
            upgrade: UpgradeHook::Ready,
            build: Hook::Ok,
            mount: Hook::Ok,
            layout: Hook::Ok,
            fail_layout_after: None,
            consent_policy: None,
            purposes: None,
            supported_layouts: None,
            placeholder: None,
            fail_actions: false,
        }
    }

    pub(crate) fn legacy() -> Self {
        Self {
            r1: false,
            ..Self::r1()
        }
    }
}

/// Component whose behaviour comes from a [`Script`]; every hook call is
/// recorded by name.
pub(crate) struct Scripted {
    script: Script,
    calls: Mutex<Vec<String>>,
    actions: Mutex<Vec<(String, bool)>>,
}

impl Scripted {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
            actions: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn called(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    /// `(method, deferred)` for every executed action.
    pub(crate) fn actions(&self) -> Vec<(String, bool)> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComponentImpl for Scripted {
    fn is_r1(&self) -> bool {
        self.script.r1
    }

    fn uses_loading(&self) -> bool {
        self.script.uses_loading
    }

    fn deferred_mount(&self) -> bool {
        self.script.deferred_mount
    }

    fn is_layout_supported(&self, layout: Layout) -> bool {
        self.script
            .supported_layouts
            .as_ref()
            .map_or(true, |supported| supported.contains(&layout))
    }

    fn upgrade_callback(&self) -> Upgrade {
        self.record("upgrade");
        match &self.script.upgrade {
            UpgradeHook::Ready => Upgrade::Ready,
            UpgradeHook::Replace(next) => Upgrade::Replace(Arc::clone(next)),
            UpgradeHook::Deferred(hook) => {
                let hook = hook.clone();
                Upgrade::Deferred(async move { hook.run().await.map(|()| None) }.boxed())
            }
        }
    }

    async fn build_callback(&self) -> Result<(), LifecycleError> {
        self.record("build");
        self.script.build.run().await
    }

    async fn mount_callback(&self, _signal: &CancellationToken) -> Result<(), LifecycleError> {
        self.record("mount");
        self.script.mount.run().await
    }

    fn unmount_callback(&self) {
        self.record("unmount");
    }

    async fn layout_callback(&self, _signal: &CancellationToken) -> Result<(), LifecycleError> {
        self.record("layout");
        if let Some(limit) = self.script.fail_layout_after {
            if self.count("layout") > limit {
                return Err(LifecycleError::component("layout broke"));
            }
        }
        self.script.layout.run().await
    }

    fn unlayout_callback(&self) -> bool {
        self.record("unlayout");
        self.script.relayout
    }

    fn first_layout_completed(&self) {
        self.record("first-layout");
    }

    fn pause_callback(&self) {
        self.record("pause");
    }

    fn resume_callback(&self) {
        self.record("resume");
    }

    fn attached_callback(&self) {
        self.record("attached");
    }

    fn detached_callback(&self) {
        self.record("detached");
    }

    fn preconnect_callback(&self, on_layout: bool) {
        self.record(if on_layout { "preconnect-layout" } else { "preconnect" });
    }

    fn create_placeholder_callback(&self) -> Option<String> {
        self.record("placeholder");
        self.script.placeholder.clone()
    }

    fn execute_action(
        &self,
        invocation: &ActionInvocation,
        deferred: bool,
    ) -> Result<(), LifecycleError> {
        self.actions
            .lock()
            .unwrap()
            .push((invocation.method.clone(), deferred));
        if self.script.fail_actions {
            return Err(LifecycleError::component("action rejected"));
        }
        Ok(())
    }

    fn consent_policy(&self) -> Option<String> {
        self.script.consent_policy.clone()
    }

    fn purposes_consent(&self) -> Option<Vec<String>> {
        self.script.purposes.clone()
    }

    fn reconstruct_when_reparented(&self) -> bool {
        self.script.reconstruct
    }

    fn unlayout_on_pause(&self) -> bool {
        self.script.unlayout_on_pause
    }
}

/// Records every call as `(operation, element)`.
#[derive(Default)]
pub(crate) struct RecordingScheduler {
    calls: Mutex<Vec<(&'static str, ElementId)>>,
}

impl RecordingScheduler {
    fn record(&self, op: &'static str, element: &Element) {
        self.calls.lock().unwrap().push((op, element.id()));
    }

    pub(crate) fn calls_for(&self, element: &Element) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, id)| *id == element.id())
            .map(|(op, _)| *op)
            .collect()
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule_asap(&self, element: &Element) {
        self.record("schedule_asap", element);
    }

    fn schedule(&self, element: &Element) {
        self.record("schedule", element);
    }

    fn unschedule(&self, element: &Element) {
        self.record("unschedule", element);
    }

    fn set_container(&self, element: &Element, _scroller: Option<ScrollerHint>) {
        self.record("set_container", element);
    }

    fn remove_container(&self, element: &Element) {
        self.record("remove_container", element);
    }
}

#[derive(Default)]
pub(crate) struct RecordingResources {
    calls: Mutex<Vec<(&'static str, ElementId)>>,
}

impl RecordingResources {
    fn record(&self, op: &'static str, element: &Element) {
        self.calls.lock().unwrap().push((op, element.id()));
    }

    pub(crate) fn calls_for(&self, element: &Element) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, id)| *id == element.id())
            .map(|(op, _)| *op)
            .collect()
    }
}

impl ResourceCoordinator for RecordingResources {
    fn add(&self, element: &Element) {
        self.record("add", element);
    }

    fn remove(&self, element: &Element) {
        self.record("remove", element);
    }

    fn upgraded(&self, element: &Element) {
        self.record("upgraded", element);
    }

    fn get_state(&self, _element: &Element) -> Option<ResourceState> {
        None
    }

    fn measure(&self, _element: &Element) -> Option<LayoutRect> {
        None
    }

    fn request_measure(&self, element: &Element) {
        self.record("request_measure", element);
    }

    fn schedule_layout_or_preload(
        &self,
        element: &Element,
        _is_layout: bool,
        _priority: Option<u32>,
        _force_outside_viewport: bool,
    ) {
        self.record("schedule_layout", element);
    }
}

/// An isolated runtime wired with recording collaborators.
pub(crate) struct Harness {
    pub runtime: Runtime,
    pub clock: Arc<FixedClock>,
    pub scheduler: Arc<RecordingScheduler>,
    pub resources: Arc<RecordingResources>,
    pub consent: Arc<InMemoryConsent>,
    pub reporter: Arc<CollectingErrorReporter>,
}

#[derive(Default)]
struct Overrides {
    scheduler: Option<Arc<dyn Scheduler>>,
    resources: Option<Arc<dyn ResourceCoordinator>>,
    without_consent: bool,
    config: Option<RuntimeConfig>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::wire(Overrides::default())
    }

    pub(crate) fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::wire(Overrides {
            scheduler: Some(scheduler),
            ..Overrides::default()
        })
    }

    pub(crate) fn with_resources(resources: Arc<dyn ResourceCoordinator>) -> Self {
        Self::wire(Overrides {
            resources: Some(resources),
            ..Overrides::default()
        })
    }

    pub(crate) fn with_config(config: RuntimeConfig) -> Self {
        Self::wire(Overrides {
            config: Some(config),
            ..Overrides::default()
        })
    }

    pub(crate) fn without_consent() -> Self {
        Self::wire(Overrides {
            without_consent: true,
            ..Overrides::default()
        })
    }

    fn wire(overrides: Overrides) -> Self {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let scheduler = Arc::new(RecordingScheduler::default());
        let resources = Arc::new(RecordingResources::default());
        let consent = Arc::new(InMemoryConsent::new());
        let reporter = Arc::new(CollectingErrorReporter::new());

        let mut builder = Runtime::builder()
            .clock(clock.clone())
            .reporter(reporter.clone())
            .scheduler(
                overrides
                    .scheduler
                    .unwrap_or_else(|| scheduler.clone() as Arc<dyn Scheduler>),
            )
            .resources(
                overrides
                    .resources
                    .unwrap_or_else(|| resources.clone() as Arc<dyn ResourceCoordinator>),
            )
            .config(overrides.config.unwrap_or_default());
        if !overrides.without_consent {
            builder = builder.consent(consent.clone());
        }

        Self {
            runtime: builder.build().unwrap(),
            clock,
            scheduler,
            resources,
            consent,
            reporter,
        }
    }

    /// A fresh `x-test` element upgraded with a scripted component (not yet
    /// connected).
    pub(crate) fn element(&self, script: Script) -> (Element, Arc<Scripted>) {
        self.element_with(HashMap::new(), script)
    }

    pub(crate) fn element_with(
        &self,
        attributes: HashMap<String, String>,
        script: Script,
    ) -> (Element, Arc<Scripted>) {
        let element = self.runtime.create_element("x-test", attributes);
        let component = Arc::new(Scripted::new(script));
        assert!(element.upgrade(component.clone()));
        (element, component)
    }

    pub(crate) fn connect(&self, element: &Element) {
        element.node().set_dom_connected(true);
        element.connected_callback();
    }

    pub(crate) fn disconnect(&self, element: &Element) {
        element.node().set_dom_connected(false);
        element.disconnected_callback();
    }

    /// Lets spawned lifecycle tasks run to their next suspension point.
    pub(crate) async fn settle(&self) {
        for _ in 0..64 {
            tokio::task::yield_now().await;
        }
    }
}

pub(crate) fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
