//! ErrorReporter の実装
//!
//! - **TracingErrorReporter**: `tracing` の error イベントとして出力（デフォルト）
//! - **CollectingErrorReporter**: 報告を溜めておく（テスト・CLI の集計用）

use std::sync::Mutex;

use tracing::error;

use crate::domain::{ElementId, LifecycleError};
use crate::ports::ErrorReporter;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, element: ElementId, tag: &str, err: &LifecycleError) {
        error!(element = %element, tag, kind = ?err.kind(), error = %err, "lifecycle error");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportedError {
    pub element: ElementId,
    pub tag: String,
    pub error: LifecycleError,
}

#[derive(Debug, Default)]
pub struct CollectingErrorReporter {
    reports: Mutex<Vec<ReportedError>>,
}

impl CollectingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ReportedError> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn errors(&self) -> Vec<LifecycleError> {
        self.reports().into_iter().map(|report| report.error).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report(&self, element: ElementId, tag: &str, err: &LifecycleError) {
        error!(element = %element, tag, kind = ?err.kind(), error = %err, "lifecycle error");
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ReportedError {
                element,
                tag: tag.to_string(),
                error: err.clone(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn collecting_reporter_keeps_order() {
        let reporter = CollectingErrorReporter::new();
        let element = ElementId::from(Ulid::new());
        assert!(reporter.is_empty());

        reporter.report(element, "x-img", &LifecycleError::component("first"));
        reporter.report(element, "x-img", &LifecycleError::Cancelled);

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].tag, "x-img");
        assert_eq!(
            reporter.errors(),
            vec![LifecycleError::component("first"), LifecycleError::Cancelled]
        );
    }
}
