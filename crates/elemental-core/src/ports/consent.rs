//! ConsentService port - 同意ポリシーの外部サービス

use async_trait::async_trait;

/// Resolves consent decisions for the build-time consent gate.
///
/// Both methods may stay pending until the user decides; `false` means
/// consent was withheld.
#[async_trait]
pub trait ConsentService: Send + Sync {
    async fn when_policy_unblock(&self, policy_id: &str) -> bool;

    async fn when_purposes_unblock(&self, purpose_ids: &[String]) -> bool;
}
