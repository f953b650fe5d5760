//! ComponentRegistry - tag ごとの factory を登録・管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性
//! - Arc による共有所有権

use std::collections::HashMap;
use std::sync::Arc;

use super::contract::ComponentImpl;
use super::factory::{ClassFactory, ComponentClass, ComponentFactory, FnFactory};
use crate::element::WeakElement;

/// ComponentRegistry は tag → factory の対応を保持
///
/// # 使用例
/// ```ignore
/// let mut registry = ComponentRegistry::new();
/// registry.register::<Carousel>()?;
/// let factory = registry.get("x-carousel").unwrap();
/// ```
#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Arc<dyn ComponentFactory>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("component for tag '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("tag '{0}' is not a valid custom element name")]
    InvalidTag(String),
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register<C: ComponentClass>(&mut self) -> Result<Arc<dyn ComponentFactory>, RegistryError> {
        self.register_factory(Arc::new(ClassFactory::<C>::new()))
    }

    pub fn register_fn<F>(
        &mut self,
        tag: impl Into<String>,
        create: F,
    ) -> Result<Arc<dyn ComponentFactory>, RegistryError>
    where
        F: Fn(WeakElement) -> Arc<dyn ComponentImpl> + Send + Sync + 'static,
    {
        self.register_factory(Arc::new(FnFactory::new(tag, create)))
    }

    pub fn register_factory(
        &mut self,
        factory: Arc<dyn ComponentFactory>,
    ) -> Result<Arc<dyn ComponentFactory>, RegistryError> {
        let tag = normalize_tag(factory.tag())?;
        if self.factories.contains_key(&tag) {
            return Err(RegistryError::AlreadyRegistered(tag));
        }
        self.factories.insert(tag, Arc::clone(&factory));
        Ok(factory)
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn ComponentFactory>> {
        self.factories.get(&tag.to_ascii_lowercase()).cloned()
    }

    pub fn registered_tags(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Custom element names are lowercase and contain a hyphen.
fn normalize_tag(tag: &str) -> Result<String, RegistryError> {
    let tag = tag.to_ascii_lowercase();
    let valid = tag.contains('-')
        && tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.' || c == '_');
    if valid {
        Ok(tag)
    } else {
        Err(RegistryError::InvalidTag(tag))
    }
}
