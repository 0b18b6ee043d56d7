use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use crate::types::ResolveStats;

/// Observer for resolution runs.
pub trait AnchorMetrics: Send + Sync {
    fn record_resolve(&self, latency: Duration, stats: &ResolveStats);
}

/// Install or clear the global anchor metrics recorder.
pub fn set_anchor_metrics(recorder: Option<Arc<dyn AnchorMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn AnchorMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn AnchorMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn AnchorMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}
