//! Maintenance Pool
//!
//! Small worker pool that finishes removals off the caller's thread: removed
//! variant maps are dropped here and the removal listener, if any, is run.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

use crate::cache::{Key, VariantMap};
use crate::error::{Result, StorageError};

// == Removal Notification ==
/// Why a URI family left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// `invalidate_uri`, `invalidate_key`, `clear` or replacement on insert
    Explicit,
    /// Evicted to respect the capacity bound
    Size,
}

/// Delivered to the removal listener once per removed URI family.
#[derive(Debug, Clone)]
pub struct RemovalNotification {
    pub uri: Url,
    /// Every variant that was stored under `uri`
    pub keys: Vec<Key>,
    pub cause: RemovalCause,
}

/// Callback run on the maintenance pool for each removal.
pub type RemovalListener = Arc<dyn Fn(RemovalNotification) + Send + Sync>;

struct Removal {
    notification: RemovalNotification,
    variants: VariantMap,
}

// == Maintenance Pool ==
/// Owns the runtime used for removal bookkeeping.
pub struct MaintenancePool {
    runtime: Mutex<Option<Runtime>>,
    sender: mpsc::UnboundedSender<Removal>,
}

impl MaintenancePool {
    /// Starts `threads` workers (at least one) draining removals.
    ///
    /// # Arguments
    /// * `threads` - Worker thread count
    /// * `listener` - Optional callback run for every removal
    pub fn start(threads: usize, listener: Option<RemovalListener>) -> Result<Self> {
        let threads = threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name("vary-cache-maintenance")
            .enable_time()
            .build()
            .map_err(|e| StorageError::Runtime(e.to_string()))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(drain_removals(receiver, listener));
        info!("Maintenance pool started with {} worker thread(s)", threads);

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            sender,
        })
    }

    // == Submit ==
    /// Hands a removed family to the pool.
    ///
    /// After shutdown the family is dropped on the calling thread instead.
    pub fn submit(&self, uri: Url, variants: VariantMap, cause: RemovalCause) {
        let keys = variants
            .varies()
            .map(|vary| Key::new(uri.clone(), vary.clone()))
            .collect();
        let removal = Removal {
            notification: RemovalNotification { uri, keys, cause },
            variants,
        };
        if let Err(mpsc::error::SendError(removal)) = self.sender.send(removal) {
            debug!(uri = %removal.notification.uri, "maintenance pool stopped, dropping removal");
        }
    }

    pub fn is_running(&self) -> bool {
        self.runtime.lock().is_some()
    }

    // == Shutdown ==
    /// Stops the workers. Removals still queued may be dropped unseen.
    pub fn shutdown(&self) {
        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_background();
            info!("Maintenance pool stopped");
        }
    }
}

impl Drop for MaintenancePool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for MaintenancePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaintenancePool")
            .field("running", &self.is_running())
            .finish()
    }
}

async fn drain_removals(
    mut receiver: mpsc::UnboundedReceiver<Removal>,
    listener: Option<RemovalListener>,
) {
    while let Some(removal) = receiver.recv().await {
        let listener = listener.clone();
        tokio::spawn(async move {
            let Removal {
                notification,
                variants,
            } = removal;
            debug!(
                uri = %notification.uri,
                variants = variants.len(),
                cause = ?notification.cause,
                "removed cache entry"
            );
            drop(variants);
            if let Some(listener) = listener {
                listener(notification);
            }
        });
    }
    debug!("Removal channel closed");
}
