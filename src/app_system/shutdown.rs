use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Broadcast stop signal shared by every long-lived task.
///
/// Closing is permanent. Any number of clones may call [`ShutdownHandle::close`]
/// concurrently; the token is cancelled by the first and the rest are no-ops.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
    closed: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every worker to stop. Returns `true` only for the call that
    /// actually closed the system.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::AcqRel);
        // Cancel on every call so that no caller returns before the token is set.
        self.token.cancel();
        if first {
            info!("Order system closed");
        } else {
            debug!("Order system already closed");
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
