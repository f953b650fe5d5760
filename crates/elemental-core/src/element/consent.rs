//! Consent gate - build 内で consent の解除を待つ
//!
//! policy id は実装の `consent_policy()`、なければ `data-block-on-consent`
//! 属性（空なら `"default"`）。purpose は実装の `purposes_consent()`、なければ
//! カンマ区切りの `data-block-on-consent-purposes` 属性。
//! policy がある場合は purpose を見ません。

use tracing::{debug, warn};

use super::node::{ATTR_BLOCK_ON_CONSENT, ATTR_BLOCK_ON_CONSENT_PURPOSES, ElementNode};
use super::promise::LifecycleResult;
use super::Element;
use crate::component::ComponentImpl;
use crate::domain::LifecycleError;

const DEFAULT_POLICY: &str = "default";

fn consent_policy(implementation: &dyn ComponentImpl, node: &ElementNode) -> Option<String> {
    implementation.consent_policy().or_else(|| {
        node.attribute(ATTR_BLOCK_ON_CONSENT).map(|value| {
            let value = value.trim();
            if value.is_empty() {
                DEFAULT_POLICY.to_string()
            } else {
                value.to_string()
            }
        })
    })
}

fn consent_purposes(implementation: &dyn ComponentImpl, node: &ElementNode) -> Option<Vec<String>> {
    implementation
        .purposes_consent()
        .or_else(|| {
            node.attribute(ATTR_BLOCK_ON_CONSENT_PURPOSES).map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|purpose| !purpose.is_empty())
                    .map(str::to_string)
                    .collect()
            })
        })
        .filter(|purposes: &Vec<String>| !purposes.is_empty())
}

impl Element {
    pub(crate) async fn consent_gate(&self, implementation: &dyn ComponentImpl) -> LifecycleResult {
        let policy = consent_policy(implementation, self.node());
        let purposes = match policy {
            Some(_) => None,
            None => consent_purposes(implementation, self.node()),
        };
        if policy.is_none() && purposes.is_none() {
            return Ok(());
        }

        let Some(consent) = self.document().consent.clone() else {
            warn!(
                element = %self.id(),
                tag = self.tag(),
                "element blocks on consent but no consent service is configured"
            );
            return Ok(());
        };

        if let Some(policy) = policy {
            debug!(element = %self.id(), tag = self.tag(), policy = %policy, "waiting for consent policy");
            if !consent.when_policy_unblock(&policy).await {
                return Err(LifecycleError::BlockedByConsent(policy));
            }
        } else if let Some(purposes) = purposes {
            debug!(element = %self.id(), tag = self.tag(), purposes = ?purposes, "waiting for consent purposes");
            if !consent.when_purposes_unblock(&purposes).await {
                return Err(LifecycleError::BlockedByConsent(purposes.join(",")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommonSignal, ReadyState};
    use crate::element::test_support::{attrs, Harness, Script};
    use rstest::rstest;
    use std::collections::HashMap;

    #[rstest]
    #[case(None, &[], None)]
    #[case(Some("analytics"), &[], Some("analytics"))]
    #[case(None, &[(ATTR_BLOCK_ON_CONSENT, "")], Some("default"))]
    #[case(None, &[(ATTR_BLOCK_ON_CONSENT, " ads ")], Some("ads"))]
    #[case(Some("analytics"), &[(ATTR_BLOCK_ON_CONSENT, "ads")], Some("analytics"))]
    fn policy_resolution(
        #[case] from_impl: Option<&str>,
        #[case] attributes: &[(&str, &str)],
        #[case] expected: Option<&str>,
    ) {
        let mut script = Script::r1();
        script.consent_policy = from_impl.map(str::to_string);
        let component = crate::element::test_support::Scripted::new(script);
        let node = ElementNode::new("x-test", attrs(attributes));
        assert_eq!(consent_policy(&component, &node).as_deref(), expected);
    }

    #[rstest]
    #[case(&[(ATTR_BLOCK_ON_CONSENT_PURPOSES, "ads, measure")], Some(vec!["ads", "measure"]))]
    #[case(&[(ATTR_BLOCK_ON_CONSENT_PURPOSES, " , ")], None)]
    #[case(&[], None)]
    fn purposes_resolution(
        #[case] attributes: &[(&str, &str)],
        #[case] expected: Option<Vec<&str>>,
    ) {
        let component = crate::element::test_support::Scripted::new(Script::r1());
        let node = ElementNode::new("x-test", attrs(attributes));
        let expected = expected.map(|v| v.into_iter().map(str::to_string).collect::<Vec<_>>());
        assert_eq!(consent_purposes(&component, &node), expected);
    }

    #[tokio::test]
    async fn withheld_consent_blocks_without_reporting() {
        let harness = Harness::new();
        let (element, component) = harness.element_with(
            attrs(&[(ATTR_BLOCK_ON_CONSENT, "")]),
            Script::r1(),
        );
        harness.connect(&element);

        let build = element.build();
        harness.settle().await;
        assert_eq!(build.peek(), None);

        harness.consent.decide_policy("default", false);
        assert_eq!(
            build.await,
            Err(LifecycleError::BlockedByConsent("default".into()))
        );
        assert!(!element.is_built());
        assert!(!component.called("build"));
        assert!(harness.reporter.is_empty());
        assert_ne!(element.ready_state(), ReadyState::Error);
        assert_eq!(element.signals().get(CommonSignal::Built), None);
    }

    #[tokio::test]
    async fn a_later_build_reevaluates_consent() {
        let harness = Harness::new();
        let mut script = Script::r1();
        script.purposes = Some(vec!["ads".into()]);
        let (element, component) = harness.element(script);
        harness.connect(&element);

        harness.consent.decide_purpose("ads", false);
        let first = element.build();
        assert!(first.clone().await.unwrap_err().is_blocked_by_consent());

        harness.consent.decide_purpose("ads", true);
        let second = element.build();
        assert!(!first.ptr_eq(&second));
        assert_eq!(second.await, Ok(()));
        assert!(component.called("build"));
    }

    #[tokio::test]
    async fn missing_consent_service_lets_the_build_through() {
        let harness = Harness::without_consent();
        let (element, component) = harness.element_with(
            attrs(&[(ATTR_BLOCK_ON_CONSENT, "default")]),
            Script::r1(),
        );
        harness.connect(&element);

        assert_eq!(element.build().await, Ok(()));
        assert!(component.called("build"));
    }

    #[tokio::test]
    async fn ungated_elements_skip_the_service() {
        let harness = Harness::new();
        let (element, _component) = harness.element_with(HashMap::new(), Script::r1());
        harness.connect(&element);
        assert_eq!(element.build().await, Ok(()));
    }
}
