//! DOM 接続 / 切断
//!
//! ブラウザは接続 callback を重複して、あるいは実際には接続されていない
//! ノードに対して発火することがあります。`connected` フラグとノードの
//! DOM 所属フラグの両方でガードします。
//!
//! # 再接続（reparent）
//! 一度接続された element が再び接続されたとき、実装が
//! `reconstruct_when_reparented()` を返せば未 build の状態に戻してから
//! upgrade / build をやり直します。

use tracing::{debug, info};

use super::Element;
use super::node::{ATTR_HEIGHT, ATTR_LAYOUT, ATTR_WIDTH};
use crate::domain::{CommonSignal, Layout, ReadyState, UpgradeState};

impl Element {
    pub fn connected_callback(&self) {
        if !self.node().is_dom_connected() {
            debug!(element = %self.id(), tag = self.tag(), "ignoring connect for a detached node");
            return;
        }
        let (first, implementation) = {
            let mut record = self.record();
            if record.connected {
                return;
            }
            record.connected = true;
            let first = !record.ever_attached;
            record.ever_attached = true;
            (first, record.implementation.get())
        };

        let document = self.document();
        let r1 = implementation.as_ref().is_some_and(|i| i.is_r1());
        if !r1 {
            document.resources.add(self);
        }

        let mut reconstructed = false;
        if first {
            self.apply_static_layout();
        } else if implementation
            .as_ref()
            .is_some_and(|i| i.reconstruct_when_reparented())
        {
            self.reset_unbuilt();
            reconstructed = true;
        }
        info!(element = %self.id(), tag = self.tag(), first, reconstructed, "element connected");

        let Some(implementation) = implementation else {
            return;
        };
        if first {
            // R1 elements upgrade inside `upgrade_or_schedule` below.
            if !r1 {
                self.try_upgrade();
            }
        } else if self.is_upgraded() {
            if reconstructed && !r1 {
                document.resources.upgraded(self);
            }
            if self.is_built() {
                implementation.attached_callback();
            }
        }
        if r1 {
            self.upgrade_or_schedule(false);
        }
    }

    pub fn disconnected_callback(&self) {
        self.disconnect(false);
    }

    /// Tears the connection down. With `pretend`, proceeds even though the
    /// node is still in the document (its resource record is going away).
    pub fn disconnect(&self, pretend: bool) {
        if !pretend && self.node().is_dom_connected() {
            debug!(element = %self.id(), tag = self.tag(), "ignoring disconnect for an attached node");
            return;
        }
        let (implementation, upgraded) = {
            let mut record = self.record();
            if !record.connected {
                return;
            }
            record.connected = false;
            (
                record.implementation.get(),
                record.upgrade_state == UpgradeState::Upgraded,
            )
        };
        let r1 = implementation.as_ref().is_some_and(|i| i.is_r1());
        if !r1 {
            self.document().resources.remove(self);
        }
        if let Some(implementation) = implementation.filter(|_| upgraded) {
            implementation.detached_callback();
        }
        info!(element = %self.id(), tag = self.tag(), pretend, "element disconnected");
        if r1 {
            self.unmount();
        }
    }

    fn apply_static_layout(&self) {
        let node = self.node();
        let layout = Layout::from_attributes(
            node.attribute(ATTR_LAYOUT).as_deref(),
            node.attribute(ATTR_WIDTH).as_deref(),
            node.attribute(ATTR_HEIGHT).as_deref(),
        );
        match layout {
            Ok(layout) => self.record().layout = layout,
            Err(err) => self.report(&err),
        }
    }

    /// Returns the record to the unbuilt state so the next build starts over.
    ///
    /// A build still in flight is kept: build cannot be cancelled, and the
    /// next `build()` joins it instead of starting a second one.
    fn reset_unbuilt(&self) {
        let in_flight = {
            let mut record = self.record();
            let in_flight = record
                .build_promise
                .as_ref()
                .is_some_and(|promise| promise.peek().is_none());
            if !in_flight {
                record.built = false;
                record.build_promise = None;
                record.first_layout_completed = false;
            }
            if record.upgrade_state == UpgradeState::Upgraded {
                record.ready_state = ReadyState::Building;
            }
            in_flight
        };
        if !in_flight {
            self.signals().reset(CommonSignal::Built);
        }
        self.reset_cycle(true);
        debug!(element = %self.id(), tag = self.tag(), in_flight, "reparented element reset to unbuilt");
    }
}
