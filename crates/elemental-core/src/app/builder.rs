//! RuntimeBuilder - runtime の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 未指定の port は in-memory 実装で埋める

use std::sync::Arc;

use super::config::RuntimeConfig;
use super::document::DocumentContext;
use super::runtime::{Host, Runtime};
use crate::component::{ComponentClass, ComponentImpl, ComponentRegistry, RegistryError};
use crate::element::WeakElement;
use crate::impls::{AsapScheduler, InMemoryResources, TracingErrorReporter};
use crate::ports::{
    Clock, ConsentService, ErrorReporter, IdGenerator, ResourceCoordinator, Scheduler,
    SystemClock, UlidGenerator,
};

/// RuntimeBuilder は Runtime を構築
///
/// # 使用例
/// ```ignore
/// let runtime = RuntimeBuilder::new()
///     .consent(Arc::new(InMemoryConsent::new()))
///     .register::<Carousel>()?
///     .expect_components(&["x-carousel"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_components() で期待される tag を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
pub struct RuntimeBuilder {
    registry: ComponentRegistry,
    expected_components: Option<Vec<String>>,
    config: RuntimeConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    resources: Option<Arc<dyn ResourceCoordinator>>,
    consent: Option<Arc<dyn ConsentService>>,
}

/// BuildError は runtime 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These tags were expected but not registered.")]
    MissingComponents(Vec<String>),
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::new(),
            expected_components: None,
            config: RuntimeConfig::default(),
            clock: None,
            ids: None,
            reporter: None,
            scheduler: None,
            resources: None,
            consent: None,
        }
    }

    /// Component を登録
    pub fn register<C: ComponentClass>(mut self) -> Result<Self, RegistryError> {
        self.registry.register::<C>()?;
        Ok(self)
    }

    pub fn register_fn<F>(mut self, tag: &str, create: F) -> Result<Self, RegistryError>
    where
        F: Fn(WeakElement) -> Arc<dyn ComponentImpl> + Send + Sync + 'static,
    {
        self.registry.register_fn(tag, create)?;
        Ok(self)
    }

    /// 期待される tag のリストを設定
    pub fn expect_components(mut self, tags: &[&str]) -> Self {
        self.expected_components = Some(tags.iter().map(|tag| tag.to_ascii_lowercase()).collect());
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn resources(mut self, resources: Arc<dyn ResourceCoordinator>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn consent(mut self, consent: Arc<dyn ConsentService>) -> Self {
        self.consent = Some(consent);
        self
    }

    /// RuntimeBuilder を構築して Runtime を生成
    ///
    /// # 検証
    /// - expect_components() で設定された tag が全て登録されているかチェック
    /// - 不足があれば BuildError::MissingComponents を返す
    pub fn build(self) -> Result<Runtime, BuildError> {
        if let Some(expected) = &self.expected_components {
            let registered = self.registry.registered_tags();
            let missing: Vec<String> = expected
                .iter()
                .filter(|tag| !registered.contains(tag))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingComponents(missing));
            }
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(TracingErrorReporter));
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(AsapScheduler::new()));
        let resources = self
            .resources
            .unwrap_or_else(|| Arc::new(InMemoryResources::new()));

        let mut document = DocumentContext::new(scheduler, resources);
        if let Some(consent) = self.consent {
            document = document.with_consent(consent);
        }

        Ok(Runtime::from_host(Host::new(
            self.config,
            clock,
            ids,
            reporter,
            document,
            self.registry,
        )))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
