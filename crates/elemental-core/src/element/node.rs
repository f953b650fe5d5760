//! ElementNode - ホスト側 DOM ノードのプレーンなデータ表現
//!
//! Controller はノードを継承せず、参照として保持するだけです（composition）。
//! ホストは DOM への接続状態を `set_dom_connected` で反映してから
//! `connected_callback` / `disconnected_callback` を転送します。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

pub const ATTR_LAYOUT: &str = "layout";
pub const ATTR_WIDTH: &str = "width";
pub const ATTR_HEIGHT: &str = "height";
pub const ATTR_BLOCK_ON_CONSENT: &str = "data-block-on-consent";
pub const ATTR_BLOCK_ON_CONSENT_PURPOSES: &str = "data-block-on-consent-purposes";

#[derive(Debug)]
pub struct ElementNode {
    tag: String,
    attributes: RwLock<HashMap<String, String>>,
    dom_connected: AtomicBool,
    placeholder: Mutex<Option<String>>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>, attributes: HashMap<String, String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: RwLock::new(attributes),
            dom_connected: AtomicBool::new(false),
            placeholder: Mutex::new(None),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.attributes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
    }

    /// Whether the node is actually part of a document tree.
    pub fn is_dom_connected(&self) -> bool {
        self.dom_connected.load(Ordering::Acquire)
    }

    pub fn set_dom_connected(&self, connected: bool) {
        self.dom_connected.store(connected, Ordering::Release);
    }

    pub fn placeholder(&self) -> Option<String> {
        self.placeholder
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Inserts a placeholder child unless one exists. Returns whether it was
    /// inserted.
    pub fn insert_placeholder(&self, tag: String) -> bool {
        let mut placeholder = self.placeholder.lock().unwrap_or_else(|e| e.into_inner());
        if placeholder.is_some() {
            return false;
        }
        *placeholder = Some(tag);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_lowercased() {
        let node = ElementNode::new("X-Img", HashMap::new());
        assert_eq!(node.tag(), "x-img");
    }

    #[test]
    fn attributes_and_placeholder() {
        let node = ElementNode::new("x-img", HashMap::new());
        assert!(!node.has_attribute(ATTR_LAYOUT));
        node.set_attribute(ATTR_LAYOUT, "fill");
        assert_eq!(node.attribute(ATTR_LAYOUT).as_deref(), Some("fill"));
        node.remove_attribute(ATTR_LAYOUT);
        assert_eq!(node.attribute(ATTR_LAYOUT), None);

        assert!(node.insert_placeholder("img".into()));
        assert!(!node.insert_placeholder("div".into()));
        assert_eq!(node.placeholder().as_deref(), Some("img"));
    }
}
