//! Cache maintenance task
//!
//! The cache only runs its housekeeping while it is being used. This task
//! runs it on a timer, so an idle cache still releases expired values, and
//! drops their keys from the group index.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheProvider;

/// Spawn a task running [`CacheProvider::purge_expired`] every `interval`.
///
/// The task runs until aborted through the returned handle, typically on
/// graceful shutdown.
pub fn spawn_sweeper(cache: Arc<CacheProvider>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting cache sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                info!(removed, "cache sweep dropped expired keys");
            } else {
                debug!("cache sweep found no expired entries");
            }
        }
    })
}
