//! User action invocations (e.g. `on="tap:gallery.next"`).

use serde::{Deserialize, Serialize};

/// Trust level of the event that triggered an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTrust {
    Low,
    Default,
    High,
}

/// One action invocation targeted at an element.
///
/// Invocations arriving before the element is built are queued and replayed
/// in FIFO order with `deferred = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub method: String,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub args: serde_json::Value,

    pub trust: ActionTrust,
}

impl ActionInvocation {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: serde_json::Value::Null,
            trust: ActionTrust::Default,
        }
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }

    pub fn with_trust(mut self, trust: ActionTrust) -> Self {
        self.trust = trust;
        self
    }
}
