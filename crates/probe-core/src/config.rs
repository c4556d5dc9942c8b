//! Bridge tuning knobs.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Limits shared by the serializer and the tool facade.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Depth used when a caller does not pass one.
    pub default_max_depth: i32,
    /// Collections longer than this become `{type, size}` summaries.
    pub collection_cap: usize,
    /// Maximum fields, and separately maximum properties, per member dump.
    pub member_cap: usize,
    /// How long a caller waits for the host tick to answer.
    pub call_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_max_depth: 1,
            collection_cap: 20,
            member_cap: 50,
            call_timeout_ms: 2000,
        }
    }
}

impl BridgeConfig {
    /// Defaults overlaid with `PROBE_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        overlay("PROBE_MAX_DEPTH", &mut config.default_max_depth);
        overlay("PROBE_COLLECTION_CAP", &mut config.collection_cap);
        overlay("PROBE_MEMBER_CAP", &mut config.member_cap);
        overlay("PROBE_CALL_TIMEOUT_MS", &mut config.call_timeout_ms);
        config
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

fn overlay<T: std::str::FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!(key, value = %raw, "ignoring unparseable config value"),
    }
}
