//! SignalBoard - 名前付きの one-shot イベント
//!
//! # 学習ポイント
//! - `tokio::sync::watch` を「一度だけ解決される promise」として使う
//! - 待ち手は `Receiver::wait_for` で値が入るまで待つ
//! - reset は解決済みの slot だけを捨てる（pending の待ち手は次の解決を受け取る）

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::domain::LifecycleError;
use crate::ports::Clock;

/// Settled value of a signal: the resolution time or the rejection.
pub type SignalOutcome = Result<DateTime<Utc>, LifecycleError>;

type Slot = watch::Sender<Option<SignalOutcome>>;

/// Per-element register of named one-shot signals.
pub struct SignalBoard {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl SignalBoard {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolves `name` with the current time. First resolution wins.
    pub fn signal(&self, name: impl AsRef<str>) -> bool {
        let now = self.clock.now();
        self.settle(name.as_ref(), Ok(now))
    }

    /// Resolves `name` with an explicit time.
    pub fn signal_at(&self, name: impl AsRef<str>, time: DateTime<Utc>) -> bool {
        self.settle(name.as_ref(), Ok(time))
    }

    /// Rejects `name`. Ignored when the signal already settled.
    pub fn reject_signal(&self, name: impl AsRef<str>, error: LifecycleError) -> bool {
        self.settle(name.as_ref(), Err(error))
    }

    fn settle(&self, name: &str, outcome: SignalOutcome) -> bool {
        let mut slots = self.slots();
        let slot = slots
            .entry(name.to_string())
            .or_insert_with(|| watch::channel(None).0);
        if slot.borrow().is_some() {
            return false;
        }
        slot.send_replace(Some(outcome));
        true
    }

    /// Waits until `name` settles. Creates a pending entry if absent.
    pub fn when_signal(
        &self,
        name: impl AsRef<str>,
    ) -> impl Future<Output = SignalOutcome> + Send + 'static {
        let name = name.as_ref().to_string();
        let mut rx = {
            let mut slots = self.slots();
            slots
                .entry(name.clone())
                .or_insert_with(|| watch::channel(None).0)
                .subscribe()
        };
        async move {
            let settled = match rx.wait_for(Option::is_some).await {
                Ok(value) => (*value).clone(),
                Err(_) => None,
            };
            settled.unwrap_or(Err(LifecycleError::SignalDropped(name)))
        }
    }

    /// Returns a settled signal to pending. Pending signals are left alone so
    /// their waiters see the next settlement.
    pub fn reset(&self, name: impl AsRef<str>) {
        let mut slots = self.slots();
        let settled = slots
            .get(name.as_ref())
            .is_some_and(|slot| slot.borrow().is_some());
        if settled {
            slots.remove(name.as_ref());
        }
    }

    /// Synchronous peek; never creates an entry.
    pub fn get(&self, name: impl AsRef<str>) -> Option<SignalOutcome> {
        self.slots()
            .get(name.as_ref())
            .and_then(|slot| slot.borrow().clone())
    }

    /// Names of the signals that resolved successfully.
    pub fn resolved(&self) -> Vec<String> {
        self.slots()
            .iter()
            .filter(|(_, slot)| matches!(*slot.borrow(), Some(Ok(_))))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
