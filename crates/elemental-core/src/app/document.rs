//! DocumentContext - ドキュメント単位で共有される協調サービス
//!
//! Element は最初の接続時に自分の document context を解決し、以後は
//! それを通して Scheduler / ResourceCoordinator / ConsentService を呼びます。
//! サービス側が element の record を直接書き換えることはありません。

use std::fmt;
use std::sync::Arc;

use crate::ports::{ConsentService, ResourceCoordinator, Scheduler};

#[derive(Clone)]
pub struct DocumentContext {
    pub scheduler: Arc<dyn Scheduler>,
    pub resources: Arc<dyn ResourceCoordinator>,

    /// `None` when the page has no consent service; gated builds then pass.
    pub consent: Option<Arc<dyn ConsentService>>,
}

impl DocumentContext {
    pub fn new(scheduler: Arc<dyn Scheduler>, resources: Arc<dyn ResourceCoordinator>) -> Self {
        Self {
            scheduler,
            resources,
            consent: None,
        }
    }

    pub fn with_consent(mut self, consent: Arc<dyn ConsentService>) -> Self {
        self.consent = Some(consent);
        self
    }
}

impl fmt::Debug for DocumentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentContext")
            .field("consent", &self.consent.is_some())
            .finish_non_exhaustive()
    }
}
