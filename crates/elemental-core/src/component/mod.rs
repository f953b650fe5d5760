//! Component - 差し込み可能な実装の API
//!
//! - **contract**: `ComponentImpl` trait（capability flag と lifecycle hook）
//! - **factory**: `ComponentClass` / `ComponentFactory`（型消去）
//! - **registry**: tag → factory の registry

pub mod contract;
pub mod factory;
pub mod registry;

pub use self::contract::{ComponentImpl, Upgrade};
pub use self::factory::{ClassFactory, ComponentClass, ComponentFactory, FnFactory};
pub use self::registry::{ComponentRegistry, RegistryError};
