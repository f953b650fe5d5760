//! Runtime - element を作り、component を登録する入口
//!
//! # 学習ポイント
//! - プロセス全体のキャッシュ（registry, stub list）を Runtime インスタンスに閉じ込める
//! - テストごとに独立した Runtime を作れる
//! - 未登録 tag の element は stub として保持し、登録時に upgrade する

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use tracing::{debug, info};

use super::builder::RuntimeBuilder;
use super::config::RuntimeConfig;
use super::document::DocumentContext;
use crate::component::{ComponentClass, ComponentFactory, ComponentImpl, ComponentRegistry, RegistryError};
use crate::element::{Element, ElementNode, WeakElement};
use crate::ports::{Clock, ErrorReporter, IdGenerator};

/// Shared state behind every element created by one runtime.
pub(crate) struct Host {
    pub(crate) config: RuntimeConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    document: Arc<DocumentContext>,
    registry: RwLock<ComponentRegistry>,
    stubs: Mutex<Vec<WeakElement>>,
}

impl Host {
    pub(crate) fn new(
        config: RuntimeConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        reporter: Arc<dyn ErrorReporter>,
        document: DocumentContext,
        registry: ComponentRegistry,
    ) -> Self {
        Self {
            config,
            clock,
            ids,
            reporter,
            document: Arc::new(document),
            registry: RwLock::new(registry),
            stubs: Mutex::new(Vec::new()),
        }
    }

    /// Document context for a node. A runtime serves a single document.
    pub(crate) fn document_for(&self, _node: &ElementNode) -> Arc<DocumentContext> {
        Arc::clone(&self.document)
    }

    fn registry(&self) -> RwLockReadGuard<'_, ComponentRegistry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Runtime は element と component registry の所有者
///
/// # 使用例
/// ```ignore
/// let runtime = Runtime::builder()
///     .register::<Carousel>()?
///     .build()?;
///
/// let element = runtime.create_element("x-carousel", HashMap::new());
/// element.node().set_dom_connected(true);
/// element.connected_callback();
/// ```
#[derive(Clone)]
pub struct Runtime {
    host: Arc<Host>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub(crate) fn from_host(host: Host) -> Self {
        Self {
            host: Arc::new(host),
        }
    }

    /// Element を作成
    ///
    /// 登録済みの tag なら新しい実装で即座に upgrade、未登録なら stub として
    /// 保持し、後から登録された時点で upgrade します。
    pub fn create_element(&self, tag: &str, attributes: HashMap<String, String>) -> Element {
        let element = Element::new(Arc::clone(&self.host), ElementNode::new(tag, attributes));
        let factory = self.host.registry().get(element.tag());
        match factory {
            Some(factory) => {
                element.upgrade(factory.create(element.downgrade()));
            }
            None => {
                debug!(element = %element.id(), tag = element.tag(), "element stubbed until its component is registered");
                self.stubs().push(element.downgrade());
            }
        }
        element
    }

    pub fn register<C: ComponentClass>(&self) -> Result<(), RegistryError> {
        let factory = self
            .host
            .registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register::<C>()?;
        self.upgrade_stubs(&factory);
        Ok(())
    }

    pub fn register_fn<F>(&self, tag: &str, create: F) -> Result<(), RegistryError>
    where
        F: Fn(WeakElement) -> Arc<dyn ComponentImpl> + Send + Sync + 'static,
    {
        let factory = self
            .host
            .registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register_fn(tag, create)?;
        self.upgrade_stubs(&factory);
        Ok(())
    }

    fn upgrade_stubs(&self, factory: &Arc<dyn ComponentFactory>) {
        let matching: Vec<Element> = {
            let mut stubs = self.stubs();
            let mut matching = Vec::new();
            stubs.retain(|weak| match weak.upgrade() {
                None => false,
                Some(element) if element.tag().eq_ignore_ascii_case(factory.tag()) => {
                    matching.push(element);
                    false
                }
                Some(_) => true,
            });
            matching
        };
        if !matching.is_empty() {
            info!(tag = factory.tag(), count = matching.len(), "upgrading stubbed elements");
        }
        for element in matching {
            element.upgrade(factory.create(element.downgrade()));
        }
    }

    fn stubs(&self) -> std::sync::MutexGuard<'_, Vec<WeakElement>> {
        self.host.stubs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Live elements still waiting for their component.
    pub fn stub_count(&self) -> usize {
        self.stubs()
            .iter()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    pub fn registered_tags(&self) -> Vec<String> {
        self.host.registry().registered_tags()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.host.config
    }

    pub fn document(&self) -> Arc<DocumentContext> {
        Arc::clone(&self.host.document)
    }
}
