//! InMemoryConsent - 手動で決定を流し込む ConsentService
//!
//! policy / purpose ごとに `watch` channel を持ち、決定が入るまで待ち手を
//! 保留します。デフォルトの決定を設定すると、未決定の問い合わせにはそれを返します。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::ports::ConsentService;

type Decision = watch::Sender<Option<bool>>;

pub struct InMemoryConsent {
    policies: Mutex<HashMap<String, Decision>>,
    purposes: Mutex<HashMap<String, Decision>>,
    default: Option<bool>,
}

impl InMemoryConsent {
    /// Every query waits until a decision is recorded.
    pub fn new() -> Self {
        Self {
            policies: Mutex::new(HashMap::new()),
            purposes: Mutex::new(HashMap::new()),
            default: None,
        }
    }

    /// Undecided queries answer `granted` immediately.
    pub fn with_default(granted: bool) -> Self {
        Self {
            default: Some(granted),
            ..Self::new()
        }
    }

    pub fn decide_policy(&self, policy_id: &str, granted: bool) {
        debug!(policy = policy_id, granted, "consent policy decided");
        decide(&self.policies, policy_id, granted);
    }

    pub fn decide_purpose(&self, purpose_id: &str, granted: bool) {
        debug!(purpose = purpose_id, granted, "consent purpose decided");
        decide(&self.purposes, purpose_id, granted);
    }

    async fn wait(&self, table: &Mutex<HashMap<String, Decision>>, key: &str) -> bool {
        let mut rx = {
            let mut table = lock(table);
            match table.get(key) {
                Some(decision) => decision.subscribe(),
                None => {
                    if let Some(granted) = self.default {
                        return granted;
                    }
                    table
                        .entry(key.to_string())
                        .or_insert_with(|| watch::channel(None).0)
                        .subscribe()
                }
            }
        };
        match rx.wait_for(Option::is_some).await {
            Ok(decision) => (*decision).unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl Default for InMemoryConsent {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(table: &Mutex<HashMap<String, Decision>>) -> MutexGuard<'_, HashMap<String, Decision>> {
    table.lock().unwrap_or_else(|e| e.into_inner())
}

fn decide(table: &Mutex<HashMap<String, Decision>>, key: &str, granted: bool) {
    lock(table)
        .entry(key.to_string())
        .or_insert_with(|| watch::channel(None).0)
        .send_replace(Some(granted));
}

#[async_trait]
impl ConsentService for InMemoryConsent {
    async fn when_policy_unblock(&self, policy_id: &str) -> bool {
        self.wait(&self.policies, policy_id).await
    }

    /// Unblocks only when every purpose is granted.
    async fn when_purposes_unblock(&self, purpose_ids: &[String]) -> bool {
        for purpose in purpose_ids {
            if !self.wait(&self.purposes, purpose).await {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn waits_for_a_decision() {
        let consent = Arc::new(InMemoryConsent::new());
        let waiter = {
            let consent = Arc::clone(&consent);
            tokio::spawn(async move { consent.when_policy_unblock("default").await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        consent.decide_policy("default", true);
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn default_answers_undecided_queries() {
        let consent = InMemoryConsent::with_default(false);
        assert!(!consent.when_policy_unblock("default").await);

        consent.decide_policy("analytics", true);
        assert!(consent.when_policy_unblock("analytics").await);
    }

    #[tokio::test]
    async fn purposes_need_every_grant() {
        let consent = InMemoryConsent::with_default(true);
        consent.decide_purpose("ads", false);

        let purposes = vec!["measure".to_string(), "ads".to_string()];
        assert!(!consent.when_purposes_unblock(&purposes).await);
        assert!(consent.when_purposes_unblock(&purposes[..1]).await);
    }
}
