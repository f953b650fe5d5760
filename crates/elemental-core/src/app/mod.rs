//! App - アプリケーション層
//!
//! ports と element を組み合わせて runtime を構成します。
//!
//! # 主要コンポーネント
//! - **RuntimeBuilder**: runtime の構築とワイヤリング
//! - **Runtime**: element の作成と component 登録の入口
//! - **DocumentContext**: ドキュメント単位の協調サービス
//! - **RuntimeConfig**: 設定

pub mod builder;
pub mod config;
pub mod document;
pub mod runtime;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, RuntimeBuilder};
pub use self::config::RuntimeConfig;
pub use self::document::DocumentContext;
pub use self::runtime::Runtime;
