//! RuntimeConfig - runtime 全体の設定
//!
//! すべてのフィールドにデフォルトがあり、JSON の一部だけを上書きできます。

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Legacy elements preconnect right after build (before layout).
    pub early_preconnect: bool,

    /// Delay before an early preconnect runs.
    pub preconnect_delay_ms: u64,

    /// Legacy elements ask their implementation for a placeholder after build.
    pub create_placeholders: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            early_preconnect: true,
            preconnect_delay_ms: 1,
            create_placeholders: true,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn preconnect_delay(&self) -> Duration {
        Duration::from_millis(self.preconnect_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = RuntimeConfig::from_json(r#"{"early_preconnect": false}"#).unwrap();
        assert!(!cfg.early_preconnect);
        assert_eq!(cfg.preconnect_delay(), Duration::from_millis(1));
        assert!(cfg.create_placeholders);
    }

    #[test]
    fn unknown_types_are_errors() {
        assert!(RuntimeConfig::from_json(r#"{"preconnect_delay_ms": "soon"}"#).is_err());
    }
}
