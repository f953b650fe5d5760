//! elemental-core
//!
//! Custom element の lifecycle state machine。
//! 作成 → upgrade → build → mount / layout → pause / resume → unmount → 切断
//! を、二つのスケジューリング方式（legacy の Resource Coordinator と R1 の
//! deferred mount）にまたがって一貫して駆動します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, state, layout, signal, action, errors, status）
//! - **ports**: 抽象化レイヤー（Scheduler, ResourceCoordinator, ConsentService, ErrorReporter, Clock, IdGenerator）
//! - **signals**: element ごとの signal board
//! - **component**: 差し込み可能な実装の契約と registry
//! - **element**: lifecycle controller 本体
//! - **app**: builder, runtime, config, document context
//! - **impls**: ports の in-memory 実装
//!
//! # 使用例
//! ```ignore
//! let runtime = Runtime::builder()
//!     .register_fn("x-img", |_| Arc::new(MyImg::default()) as Arc<dyn ComponentImpl>)?
//!     .build()?;
//!
//! let element = runtime.create_element("x-img", attributes);
//! element.node().set_dom_connected(true);
//! element.connected_callback();
//! element.mount().await?;
//! ```

pub mod app;
pub mod component;
pub mod domain;
pub mod element;
pub mod impls;
pub mod ports;
pub mod signals;

pub use crate::app::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use crate::component::{ComponentImpl, Upgrade};
pub use crate::domain::{CommonSignal, LifecycleError, ReadyState, UpgradeState};
pub use crate::element::{Element, LifecyclePromise, WeakElement};
