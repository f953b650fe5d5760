//! Layout / unlayout - legacy パスと pause / resume
//!
//! legacy element は Resource Coordinator が `layout_callback` を呼びます。
//! 1 サイクルの最初の layout だけが LOAD_START / LOAD_END を出します。
//! 成功でも失敗でも layout 回数は進みます。取り消しは回数を進めません。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Element;
use super::promise::LifecycleResult;
use crate::component::ComponentImpl;
use crate::domain::{CommonSignal, LifecycleError, ReadyState};

impl Element {
    /// Lays out a built legacy element. The hook is raced against `token`.
    pub async fn layout_callback(&self, token: &CancellationToken) -> LifecycleResult {
        let (implementation, is_load) = {
            let mut record = self.record();
            if !record.built {
                return Err(LifecycleError::NotBuilt);
            }
            let Some(implementation) = record.implementation.get() else {
                return Err(LifecycleError::NotBuilt);
            };
            if token.is_cancelled() {
                return Err(LifecycleError::Cancelled);
            }
            record.loading_indicator = true;
            (implementation, record.layout_count == 0)
        };

        let signals = self.signals();
        signals.reset(CommonSignal::Unload);
        if is_load {
            signals.signal(CommonSignal::LoadStart);
        }
        implementation.preconnect_callback(true);

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(LifecycleError::Cancelled),
            laid_out = implementation.layout_callback(token) => laid_out,
        };

        if token.is_cancelled() {
            self.record().loading_indicator = false;
            debug!(element = %self.id(), tag = self.tag(), "layout cancelled");
            return Err(LifecycleError::Cancelled);
        }

        match result {
            Ok(()) => {
                if is_load {
                    signals.signal(CommonSignal::LoadEnd);
                }
                self.set_ready_state_internal(ReadyState::Complete, None);
                let first = {
                    let mut record = self.record();
                    record.layout_count += 1;
                    record.loading_indicator = false;
                    !std::mem::replace(&mut record.first_layout_completed, true)
                };
                if first {
                    implementation.first_layout_completed();
                }
                info!(element = %self.id(), tag = self.tag(), first_load = is_load, "layout complete");
                Ok(())
            }
            Err(err) => {
                if is_load {
                    signals.reject_signal(CommonSignal::LoadEnd, err.clone());
                }
                self.set_ready_state_internal(ReadyState::Error, Some(err.clone()));
                {
                    let mut record = self.record();
                    record.layout_count += 1;
                    record.loading_indicator = false;
                }
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Releases the layout's resources. Returns whether the implementation
    /// wants to be laid out again.
    ///
    /// A relayout restarts the load cycle (counter and load signals) but does
    /// not re-arm the first-layout hook, which fires once per built lifetime.
    pub fn unlayout_callback(&self) -> bool {
        let implementation = {
            let record = self.record();
            if !record.built {
                return false;
            }
            record.implementation.get()
        };
        let Some(implementation) = implementation else {
            return false;
        };

        self.signals().signal(CommonSignal::Unload);
        let relayout = implementation.unlayout_callback();
        if relayout {
            self.reset_cycle(true);
            self.record().ready_state = ReadyState::Loading;
        }
        debug!(element = %self.id(), tag = self.tag(), relayout, "element unlaid out");
        relayout
    }

    /// Pauses media and similar activity. No-op until built.
    pub fn pause(&self) {
        let Some(implementation) = self.built_implementation() else {
            return;
        };
        implementation.pause_callback();
        if !implementation.is_r1() && implementation.unlayout_on_pause() {
            self.unlayout_callback();
        }
    }

    /// No-op until built.
    pub fn resume(&self) {
        if let Some(implementation) = self.built_implementation() {
            implementation.resume_callback();
        }
    }

    fn built_implementation(&self) -> Option<Arc<dyn ComponentImpl>> {
        let record = self.record();
        if !record.built {
            return None;
        }
        record.implementation.get()
    }
}
