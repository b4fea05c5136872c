use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::interfaces::chat_transport::ChatTransportInterface;

/// Process-wide owner of the one chat transport instance. Constructed once
/// at startup and handed around via `AppState`; never looked up globally.
///
/// A failed `init`/`start` leaves the bridge degraded instead of crashing
/// the process. Discussion creation fails fast while degraded; everything
/// else keeps working on local state.
pub struct BridgeManager {
    transport: Arc<dyn ChatTransportInterface>,
    degraded: AtomicBool,
}

impl BridgeManager {
    pub fn new(transport: Arc<dyn ChatTransportInterface>) -> Self {
        Self {
            transport,
            // degraded until startup() succeeds
            degraded: AtomicBool::new(true),
        }
    }

    pub async fn startup(&self) {
        let res = match self.transport.init().await {
            Ok(()) => self.transport.start().await,
            Err(err) => Err(err),
        };
        match res {
            Ok(()) => {
                self.degraded.store(false, Ordering::Relaxed);
                info!("->> chat bridge up");
            }
            Err(err) => {
                self.degraded.store(true, Ordering::Relaxed);
                warn!(%err, "chat bridge unreachable, running degraded");
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransportInterface> {
        &self.transport
    }

    pub async fn shutdown(&self) {
        self.degraded.store(true, Ordering::Relaxed);
        self.transport.shutdown().await;
    }
}
