//! Component factories - tag から実装インスタンスを作る
//!
//! # 二層構造
//! - **表層（Typed）**: `ComponentClass` trait - `const TAG` で tag と型を対応付け
//! - **内部（Dyn）**: `ComponentFactory` trait - object-safe, registry に格納
//!
//! `ClassFactory<C>` が型消去の橋渡しをします（PhantomData パターン）。

use std::marker::PhantomData;
use std::sync::Arc;

use super::contract::ComponentImpl;
use crate::element::WeakElement;

/// A concrete component kind with a fixed tag name.
///
/// # 使用例
/// ```ignore
/// struct Carousel { element: WeakElement }
///
/// impl ComponentClass for Carousel {
///     const TAG: &'static str = "x-carousel";
///     fn create(element: WeakElement) -> Self { Self { element } }
/// }
/// ```
pub trait ComponentClass: ComponentImpl + Sized + 'static {
    /// Lowercase tag name, e.g. `x-carousel`.
    const TAG: &'static str;

    fn create(element: WeakElement) -> Self;
}

/// Object-safe constructor stored in the registry.
pub trait ComponentFactory: Send + Sync {
    fn tag(&self) -> &str;

    fn create(&self, element: WeakElement) -> Arc<dyn ComponentImpl>;
}

pub struct ClassFactory<C: ComponentClass> {
    _marker: PhantomData<fn() -> C>,
}

impl<C: ComponentClass> ClassFactory<C> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C: ComponentClass> Default for ClassFactory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ComponentClass> ComponentFactory for ClassFactory<C> {
    fn tag(&self) -> &str {
        C::TAG
    }

    fn create(&self, element: WeakElement) -> Arc<dyn ComponentImpl> {
        Arc::new(C::create(element))
    }
}

/// Closure-backed factory, handy for tests and ad-hoc components.
pub struct FnFactory<F> {
    tag: String,
    create: F,
}

impl<F> FnFactory<F>
where
    F: Fn(WeakElement) -> Arc<dyn ComponentImpl> + Send + Sync,
{
    pub fn new(tag: impl Into<String>, create: F) -> Self {
        Self {
            tag: tag.into(),
            create,
        }
    }
}

impl<F> ComponentFactory for FnFactory<F>
where
    F: Fn(WeakElement) -> Arc<dyn ComponentImpl> + Send + Sync,
{
    fn tag(&self) -> &str {
        &self.tag
    }

    fn create(&self, element: WeakElement) -> Arc<dyn ComponentImpl> {
        (self.create)(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl ComponentImpl for Plain {}

    impl ComponentClass for Plain {
        const TAG: &'static str = "x-plain";

        fn create(_element: WeakElement) -> Self {
            Plain
        }
    }

    #[test]
    fn class_factory_reports_class_tag() {
        let factory = ClassFactory::<Plain>::new();
        assert_eq!(factory.tag(), "x-plain");
        let created = factory.create(WeakElement::new());
        assert!(!created.is_r1());
    }

    #[test]
    fn fn_factory_uses_closure() {
        let factory = FnFactory::new("x-closure", |_el| Arc::new(Plain) as Arc<dyn ComponentImpl>);
        assert_eq!(factory.tag(), "x-closure");
        assert!(factory.create(WeakElement::new()).reconstruct_when_reparented());
    }
}
