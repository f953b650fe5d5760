//! ErrorReporter port - プロセス全体のエラー報告先
//!
//! 想定外のエラー（upgrade / build / mount / layout の失敗）はここに渡されます。
//! Consent block とキャンセルは渡されません。

use crate::domain::{ElementId, LifecycleError};

pub trait ErrorReporter: Send + Sync {
    fn report(&self, element: ElementId, tag: &str, error: &LifecycleError);
}
