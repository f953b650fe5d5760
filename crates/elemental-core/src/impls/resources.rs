//! InMemoryResources - legacy element 向けの ResourceCoordinator
//!
//! # 学習ポイント
//! - element を強参照で保持しない（WeakElement + ElementId）
//! - layout 要求ごとに CancellationToken を作り、remove で取り消す
//! - 状態遷移: NotBuilt → ReadyForLayout → LayoutScheduled → LayoutComplete / LayoutFailed
//!
//! viewport を持たないため、upgrade された element はすぐに build → layout されます。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::ElementId;
use crate::element::node::{ATTR_HEIGHT, ATTR_WIDTH};
use crate::element::{Element, WeakElement};
use crate::ports::{LayoutRect, ResourceCoordinator, ResourceState};

struct Entry {
    element: WeakElement,
    state: ResourceState,
    token: Option<CancellationToken>,
    measured: Option<LayoutRect>,
}

impl Entry {
    fn new(element: &Element) -> Self {
        Self {
            element: element.downgrade(),
            state: if element.is_built() {
                ResourceState::NotLaidOut
            } else {
                ResourceState::NotBuilt
            },
            token: None,
            measured: None,
        }
    }
}

pub struct InMemoryResources {
    entries: Arc<Mutex<HashMap<ElementId, Entry>>>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ElementId, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Last box recorded by `measure`, cleared by `request_measure`.
    pub fn measured(&self, element: ElementId) -> Option<LayoutRect> {
        self.entries().get(&element).and_then(|entry| entry.measured)
    }

    /// Live elements currently tracked.
    pub fn elements(&self) -> Vec<Element> {
        self.entries()
            .values()
            .filter_map(|entry| entry.element.upgrade())
            .collect()
    }
}

impl Default for InMemoryResources {
    fn default() -> Self {
        Self::new()
    }
}

fn set_state(entries: &Mutex<HashMap<ElementId, Entry>>, id: ElementId, state: ResourceState) {
    let mut entries = entries.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(entry) = entries.get_mut(&id) {
        entry.state = state;
    }
}

fn parse_dimension(value: Option<String>) -> Option<f64> {
    value?.trim().trim_end_matches("px").parse().ok()
}

impl ResourceCoordinator for InMemoryResources {
    fn add(&self, element: &Element) {
        self.entries()
            .entry(element.id())
            .or_insert_with(|| Entry::new(element));
        debug!(element = %element.id(), tag = element.tag(), "resource added");
    }

    fn remove(&self, element: &Element) {
        if let Some(entry) = self.entries().remove(&element.id()) {
            if let Some(token) = entry.token {
                token.cancel();
            }
            debug!(element = %element.id(), tag = element.tag(), "resource removed");
        }
    }

    fn upgraded(&self, element: &Element) {
        self.schedule_layout_or_preload(element, true, None, false);
    }

    fn get_state(&self, element: &Element) -> Option<ResourceState> {
        self.entries().get(&element.id()).map(|entry| entry.state)
    }

    /// Box from the `width` / `height` attributes; `None` when either is
    /// missing or not a number.
    fn measure(&self, element: &Element) -> Option<LayoutRect> {
        let width = parse_dimension(element.node().attribute(ATTR_WIDTH))?;
        let height = parse_dimension(element.node().attribute(ATTR_HEIGHT))?;
        let rect = LayoutRect {
            top: 0.0,
            left: 0.0,
            width,
            height,
        };
        if let Some(entry) = self.entries().get_mut(&element.id()) {
            entry.measured = Some(rect);
        }
        Some(rect)
    }

    fn request_measure(&self, element: &Element) {
        let relayout = {
            let mut entries = self.entries();
            match entries.get_mut(&element.id()) {
                Some(entry) => {
                    entry.measured = None;
                    entry.state != ResourceState::LayoutScheduled
                }
                None => false,
            }
        };
        if relayout && element.is_built() {
            self.schedule_layout_or_preload(element, true, None, false);
        }
    }

    fn schedule_layout_or_preload(
        &self,
        element: &Element,
        is_layout: bool,
        priority: Option<u32>,
        force_outside_viewport: bool,
    ) {
        let token = CancellationToken::new();
        {
            let mut entries = self.entries();
            let entry = entries
                .entry(element.id())
                .or_insert_with(|| Entry::new(element));
            if let Some(previous) = entry.token.replace(token.clone()) {
                previous.cancel();
            }
            entry.state = ResourceState::LayoutScheduled;
        }
        let priority = priority.unwrap_or_else(|| {
            element
                .implementation()
                .map_or(0, |implementation| implementation.layout_priority())
        });
        debug!(
            element = %element.id(),
            tag = element.tag(),
            is_layout,
            priority,
            force_outside_viewport,
            "layout scheduled"
        );

        let entries = Arc::clone(&self.entries);
        let target = element.clone();
        tokio::spawn(async move {
            let id = target.id();
            if target.build().await.is_err() {
                set_state(&entries, id, ResourceState::NotBuilt);
                return;
            }
            if !is_layout || token.is_cancelled() {
                set_state(&entries, id, ResourceState::ReadyForLayout);
                return;
            }
            let state = match target.layout_callback(&token).await {
                Ok(()) => ResourceState::LayoutComplete,
                Err(err) if err.is_cancellation() => ResourceState::NotLaidOut,
                Err(_) => ResourceState::LayoutFailed,
            };
            set_state(&entries, id, state);
        });
    }
}
