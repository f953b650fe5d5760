//! ResourceCoordinator port - legacy パスの layout 管理
//!
//! Legacy element は Resource Coordinator に登録され、coordinator が
//! `build()` → `layout_callback()` を呼ぶタイミングを決めます。

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Per-element state tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    NotBuilt,
    NotLaidOut,
    ReadyForLayout,
    LayoutScheduled,
    LayoutComplete,
    LayoutFailed,
}

/// Measured geometry of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// ResourceCoordinator decides *when* a built legacy element lays out.
pub trait ResourceCoordinator: Send + Sync {
    fn add(&self, element: &Element);

    fn remove(&self, element: &Element);

    /// The element finished upgrading and can be built.
    fn upgraded(&self, element: &Element);

    fn get_state(&self, element: &Element) -> Option<ResourceState>;

    /// Re-measures the element and returns its box.
    fn measure(&self, element: &Element) -> Option<LayoutRect>;

    /// Asks for a measure/layout pass covering the element.
    fn request_measure(&self, element: &Element);

    fn schedule_layout_or_preload(
        &self,
        element: &Element,
        is_layout: bool,
        priority: Option<u32>,
        force_outside_viewport: bool,
    );
}
