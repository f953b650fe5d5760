//! Scheduler port - R1 の mount タイミングを決める外部サービス
//!
//! Scheduler は element の private state に触れません。
//! 決めたタイミングで `Element::mount()` を呼ぶだけです。

use crate::element::Element;

/// Scroll container hint passed along with `set_container`.
pub type ScrollerHint = String;

/// Scheduler decides *when* a built R1 element mounts.
pub trait Scheduler: Send + Sync {
    /// Mount as soon as possible, regardless of visibility.
    fn schedule_asap(&self, element: &Element);

    /// Mount when the scheduler's own conditions (e.g. visibility) are met.
    fn schedule(&self, element: &Element);

    /// Forget any pending request for the element.
    fn unschedule(&self, element: &Element);

    /// Register the element as a scroll container for its children.
    fn set_container(&self, element: &Element, scroller: Option<ScrollerHint>);

    fn remove_container(&self, element: &Element);
}
