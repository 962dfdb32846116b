//! "Reload requested" broadcast, e.g. raised by a manual refresh button.

use log::debug;
use tokio::sync::broadcast::{self, error::RecvError};

/// Sending side of the reload broadcast. Clones share the same channel.
#[derive(Clone)]
pub struct ReloadBroadcast {
    tx: broadcast::Sender<()>,
}

/// Registration returned by [`ReloadBroadcast::subscribe`].
///
/// Dropping it unsubscribes. It does not keep the broadcast alive.
#[must_use = "dropping a subscription unsubscribes it"]
pub struct Subscription {
    rx: broadcast::Receiver<()>,
}

impl ReloadBroadcast {
    pub fn new() -> Self {
        // pending requests coalesce, a subscriber reloads once per wake-up
        let (tx, _) = broadcast::channel(1);
        ReloadBroadcast { tx }
    }

    pub fn subscribe(&self) -> Subscription {
        debug!("reload subscriber added");
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Notify every subscriber and return how many were notified.
    pub fn request_reload(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        debug!("reload requested, notified {notified} subscriber(s)");
        notified
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ReloadBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscription {
    /// Wait for the next reload request.
    ///
    /// Returns `false` once every [`ReloadBroadcast`] clone is gone.
    pub async fn recv(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(()) => return true,
                Err(RecvError::Lagged(skipped)) => {
                    debug!("coalesced {skipped} reload request(s)");
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }
}
