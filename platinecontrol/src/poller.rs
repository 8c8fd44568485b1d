//! Tâches de polling périodiques
//!
//! Un [`PollerHandle`] possède la tâche qu'il a lancée : la lâcher annule le
//! polling, aucune mise à jour n'a lieu après `stop()`.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle vers une tâche de polling en cours
pub struct PollerHandle {
    name: &'static str,
    token: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Lance `tick` immédiatement puis toutes les `period`
    ///
    /// Les ticks manqués (tick précédent trop long) sont sautés et non
    /// rattrapés en rafale.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let stop = token.clone();

        let join_handle = tokio::spawn(async move {
            debug!(poller = name, "Poller started ({:?})", period);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = interval.tick() => {}
                }

                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tick() => {}
                }
            }

            debug!(poller = name, "Poller stopped");
        });

        Self {
            name,
            token,
            join_handle: Some(join_handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .join_handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Arrête le polling et attend la fin de la tâche
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.join_handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!(poller = self.name, "Poller task failed: {err}");
                }
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
