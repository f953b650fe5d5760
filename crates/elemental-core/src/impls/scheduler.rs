//! AsapScheduler - viewport を持たない環境向けの Scheduler
//!
//! viewport 判定がないため、`schedule` も `schedule_asap` も次の tick で
//! mount します。`unschedule` はまだ走っていない mount 要求を取り消します。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::ElementId;
use crate::element::Element;
use crate::ports::{Scheduler, ScrollerHint};

pub struct AsapScheduler {
    pending: Arc<Mutex<HashMap<ElementId, JoinHandle<()>>>>,
    containers: Mutex<HashMap<ElementId, Option<ScrollerHint>>>,
}

impl AsapScheduler {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            containers: Mutex::new(HashMap::new()),
        }
    }

    fn request_mount(&self, element: &Element) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|_, handle| !handle.is_finished());
        if pending.contains_key(&element.id()) {
            return;
        }
        let target = element.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = target.mount().await {
                debug!(element = %target.id(), tag = target.tag(), error = %err, "scheduled mount did not complete");
            }
        });
        pending.insert(element.id(), handle);
    }

    /// Mount requests that have not finished yet.
    pub fn pending(&self) -> usize {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.values().filter(|handle| !handle.is_finished()).count()
    }

    pub fn is_container(&self, element: ElementId) -> bool {
        self.containers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&element)
    }

    pub fn scroller(&self, element: ElementId) -> Option<ScrollerHint> {
        self.containers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&element)
            .cloned()
            .flatten()
    }
}

impl Default for AsapScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for AsapScheduler {
    fn schedule_asap(&self, element: &Element) {
        self.request_mount(element);
    }

    fn schedule(&self, element: &Element) {
        self.request_mount(element);
    }

    fn unschedule(&self, element: &Element) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&element.id());
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn set_container(&self, element: &Element, scroller: Option<ScrollerHint>) {
        self.containers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(element.id(), scroller);
    }

    fn remove_container(&self, element: &Element) {
        self.containers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&element.id());
    }
}
