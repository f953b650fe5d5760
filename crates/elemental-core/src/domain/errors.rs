//! Errors - ライフサイクルのエラー型と分類
//!
//! `LifecycleError` は `Clone` です。build/mount の結果は shared future と
//! signal board を通して複数の待ち手に配られるため、各待ち手がコピーを受け取ります。

use thiserror::Error;

use super::layout::Layout;

/// ErrorKind はエラーの運用分類
///
/// - Consent / Cancellation: 想定内の結果（ローカルで回収、報告しない）
/// - それ以外: 呼び出し元へ伝播し、ErrorReporter にも渡す
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Upgrade,
    Consent,
    Build,
    Cancellation,
    Mount,
    Layout,
    Action,
    Usage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),

    #[error("layout not supported: {layout}")]
    LayoutNotSupported { layout: Layout },

    #[error("invalid layout attribute: {0}")]
    InvalidLayout(String),

    #[error("blocked by consent: {0}")]
    BlockedByConsent(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("mount failed: {0}")]
    MountFailed(String),

    #[error("layout failed: {0}")]
    LayoutFailed(String),

    #[error("action {method} failed: {reason}")]
    ActionFailed { method: String, reason: String },

    /// An abort handle was tripped while the operation was suspended.
    #[error("cancelled")]
    Cancelled,

    #[error("element is not built")]
    NotBuilt,

    #[error("signal {0} was dropped before it settled")]
    SignalDropped(String),

    /// Raised by implementation hooks.
    #[error("{0}")]
    Component(String),
}

impl LifecycleError {
    /// Shorthand for errors raised inside implementation hooks.
    pub fn component(message: impl Into<String>) -> Self {
        LifecycleError::Component(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::UpgradeFailed(_)
            | LifecycleError::LayoutNotSupported { .. }
            | LifecycleError::InvalidLayout(_) => ErrorKind::Upgrade,
            LifecycleError::BlockedByConsent(_) => ErrorKind::Consent,
            LifecycleError::BuildFailed(_) | LifecycleError::Component(_) => ErrorKind::Build,
            LifecycleError::MountFailed(_) => ErrorKind::Mount,
            LifecycleError::LayoutFailed(_) => ErrorKind::Layout,
            LifecycleError::ActionFailed { .. } => ErrorKind::Action,
            LifecycleError::Cancelled => ErrorKind::Cancellation,
            LifecycleError::NotBuilt | LifecycleError::SignalDropped(_) => ErrorKind::Usage,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        self.kind() == ErrorKind::Cancellation
    }

    pub fn is_blocked_by_consent(&self) -> bool {
        self.kind() == ErrorKind::Consent
    }

    /// Expected outcomes are recovered locally and never reported.
    pub fn is_expected(&self) -> bool {
        self.is_cancellation() || self.is_blocked_by_consent()
    }
}
