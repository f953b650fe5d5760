use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{Duration, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use elemental_core::component::ComponentClass;
use elemental_core::domain::{ElementStatus, ReadyCounts};
use elemental_core::impls::InMemoryConsent;
use elemental_core::{
    CommonSignal, ComponentImpl, Element, LifecycleError, ReadyState, Runtime, RuntimeConfig,
    WeakElement,
};

/// R1 の画像：scheduler が mount を決める
struct DemoImg {
    element: WeakElement,
}

impl ComponentClass for DemoImg {
    const TAG: &'static str = "demo-img";

    fn create(element: WeakElement) -> Self {
        Self { element }
    }
}

#[async_trait]
impl ComponentImpl for DemoImg {
    fn is_r1(&self) -> bool {
        true
    }

    fn uses_loading(&self) -> bool {
        true
    }

    async fn mount_callback(&self, signal: &CancellationToken) -> Result<(), LifecycleError> {
        // 画像のデコードの代わり
        tokio::select! {
            _ = signal.cancelled() => return Err(LifecycleError::Cancelled),
            _ = sleep(Duration::from_millis(30)) => {}
        }
        if let Some(element) = self.element.upgrade() {
            element.render_started();
            element.set_ready_state(ReadyState::Complete);
        }
        Ok(())
    }
}

/// legacy の広告：consent が出るまで build しない
struct DemoAd;

#[async_trait]
impl ComponentImpl for DemoAd {
    fn consent_policy(&self) -> Option<String> {
        Some("ads".into())
    }

    async fn layout_callback(&self, _signal: &CancellationToken) -> Result<(), LifecycleError> {
        sleep(Duration::from_millis(10)).await;
        println!("ad rendered");
        Ok(())
    }

    fn create_placeholder_callback(&self) -> Option<String> {
        Some("demo-ad-placeholder".into())
    }
}

#[derive(Serialize)]
struct Summary {
    elements: Vec<ElementStatus>,
    counts: ReadyCounts,
}

fn attributes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn attach(element: &Element) {
    element.node().set_dom_connected(true);
    element.connected_callback();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // (A) 設定：引数があれば JSON ファイルから読む
    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RuntimeConfig::default(),
    };

    // (B) runtime を組み立てる（scheduler / resources は in-memory 実装）
    let consent = Arc::new(InMemoryConsent::new());
    let runtime = Runtime::builder()
        .register::<DemoImg>()?
        .register_fn("demo-ad", |_| Arc::new(DemoAd) as Arc<dyn ComponentImpl>)?
        .expect_components(&["demo-img", "demo-ad"])
        .config(config)
        .consent(consent.clone())
        .build()?;
    info!(tags = ?runtime.registered_tags(), "runtime ready");

    // (C) element を作って DOM に接続
    let img = runtime.create_element("demo-img", attributes(&[("width", "300"), ("height", "200")]));
    let ad = runtime.create_element("demo-ad", attributes(&[("layout", "fixed-height"), ("height", "50")]));
    attach(&img);
    attach(&ad);

    // (D) 少し遅れて consent を出す
    tokio::spawn({
        let consent = consent.clone();
        async move {
            sleep(Duration::from_millis(20)).await;
            consent.decide_policy("ads", true);
        }
    });

    // (E) 完了を待つ
    timeout(Duration::from_secs(2), img.mount()).await??;
    timeout(Duration::from_secs(2), ad.signals().when_signal(CommonSignal::LoadEnd)).await??;

    let elements = vec![img.status(), ad.status()];
    let counts = ReadyCounts::from_statuses(&elements);
    println!("{}", serde_json::to_string_pretty(&Summary { elements, counts })?);
    Ok(())
}
