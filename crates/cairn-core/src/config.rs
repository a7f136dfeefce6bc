//! Reader configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Block reader configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Upper bound on each store call, in milliseconds
    pub request_timeout_ms: u64,
    /// Cell versions fetched per column
    pub cell_limit: usize,
    /// Consult the archive when the live row is absent
    pub archive_fallback: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5_000,
            cell_limit: 1,
            archive_fallback: true,
        }
    }
}

impl ReaderConfig {
    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ReaderConfig = serde_json::from_str(r#"{"request_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.cell_limit, 1);
        assert!(config.archive_fallback);
    }
}
