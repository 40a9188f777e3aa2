use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Post-commit sync worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Capacity of the event queue between entity writers and the worker.
    pub queue_capacity: usize,
    /// Seconds between periodic orphan sweeps; 0 disables them.
    pub orphan_sweep_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            orphan_sweep_secs: 300,
        }
    }
}

impl SyncConfig {
    pub fn orphan_sweep_interval(&self) -> Option<Duration> {
        (self.orphan_sweep_secs > 0).then(|| Duration::from_secs(self.orphan_sweep_secs))
    }
}
