//! Observer handle for the live item collection.
//!
//! # Invariants
//! - The callback runs on a tokio task, never inside the writing call.
//! - The current snapshot is delivered first, then one call per observed
//!   change. Rapid successive changes may be coalesced into one delivery.
//! - Dropping the handle stops delivery.

use crate::model::item::Item;
use log::debug;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn spawn<F>(
        runtime: &Handle,
        mut items_rx: watch::Receiver<Vec<Item>>,
        mut on_change: F,
    ) -> Self
    where
        F: FnMut(&[Item]) + Send + 'static,
    {
        let task = runtime.spawn(async move {
            loop {
                let snapshot = items_rx.borrow_and_update().clone();
                on_change(&snapshot);
                if items_rx.changed().await.is_err() {
                    debug!("event=items_subscription module=service status=closed");
                    break;
                }
            }
        });
        Self { task }
    }

    /// Whether the delivery task is still running.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops delivery. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
