//! Attente bornée de la convergence après `play_track`
//!
//! Spotify accepte la commande de lecture avant de l'appliquer : la piste
//! demandée n'apparaît dans l'état qu'après un ou plusieurs polls. L'attente
//! est bornée en nombre de tentatives et annulable, une nouvelle demande de
//! lecture annulant la précédente.

use crate::errors::{ControlError, Result};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_CONVERGENCE_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_CONVERGENCE_MAX_ATTEMPTS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergencePolicy {
    /// Délai entre deux polls
    pub interval: Duration,
    /// Nombre maximal de polls avant abandon
    pub max_attempts: u32,
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CONVERGENCE_INTERVAL,
            max_attempts: DEFAULT_CONVERGENCE_MAX_ATTEMPTS,
        }
    }
}

/// Demande de lecture en cours d'attente
#[derive(Debug, Clone)]
pub struct PlayTicket {
    pub generation: u64,
    pub uri: String,
    token: CancellationToken,
}

impl PlayTicket {
    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }

    fn superseded(&self) -> ControlError {
        ControlError::Superseded {
            uri: self.uri.clone(),
        }
    }
}

#[derive(Debug)]
struct ActiveWait {
    generation: u64,
    uri: String,
    token: CancellationToken,
    /// Appels `play_track` partageant cette attente
    waiters: usize,
}

#[derive(Debug, Default)]
struct Registry {
    generation: u64,
    active: Option<ActiveWait>,
}

/// Registre des attentes : au plus une attente active à la fois
#[derive(Debug, Default)]
pub struct PlayRequests {
    inner: Mutex<Registry>,
}

impl PlayRequests {
    /// Enregistre une nouvelle demande
    ///
    /// Une demande pour une autre URI annule l'attente en cours. Une demande
    /// pour la même URI rejoint l'attente en cours et partage son ticket.
    pub fn begin(&self, uri: &str) -> PlayTicket {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(active) = registry.active.as_mut() {
            if active.uri == uri {
                active.waiters += 1;
                debug!(generation = active.generation, uri, "Joining pending play request");
                return PlayTicket {
                    generation: active.generation,
                    uri: uri.to_string(),
                    token: active.token.clone(),
                };
            }
        }

        if let Some(active) = registry.active.take() {
            debug!(generation = active.generation, uri = %active.uri, "Superseding pending play request");
            active.token.cancel();
        }

        registry.generation += 1;
        let token = CancellationToken::new();
        registry.active = Some(ActiveWait {
            generation: registry.generation,
            uri: uri.to_string(),
            token: token.clone(),
            waiters: 1,
        });

        PlayTicket {
            generation: registry.generation,
            uri: uri.to_string(),
            token,
        }
    }

    /// Libère le ticket ; l'attente est retirée quand son dernier appelant
    /// a terminé
    pub fn finish(&self, ticket: &PlayTicket) {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let done = match registry.active.as_mut() {
            Some(active) if active.generation == ticket.generation => {
                active.waiters = active.waiters.saturating_sub(1);
                active.waiters == 0
            }
            _ => false,
        };
        if done {
            registry.active = None;
        }
    }

    pub fn has_active(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active
            .is_some()
    }
}

/// Vérifie, puis alterne attente et poll jusqu'à ce que `is_current` soit vrai
///
/// Renvoie le nombre de polls effectués. Les erreurs de poll comptent comme
/// des tentatives, c'est à `refresh` de les journaliser.
pub async fn wait_until_current<C, R, Fut>(
    policy: ConvergencePolicy,
    ticket: &PlayTicket,
    mut is_current: C,
    mut refresh: R,
) -> Result<u32>
where
    C: FnMut() -> bool,
    R: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut attempts = 0;

    loop {
        if ticket.is_superseded() {
            return Err(ticket.superseded());
        }
        if is_current() {
            debug!(uri = %ticket.uri, attempts, "Play request converged");
            return Ok(attempts);
        }
        if attempts >= policy.max_attempts {
            return Err(ControlError::ConvergenceTimeout {
                uri: ticket.uri.clone(),
                attempts,
            });
        }

        tokio::select! {
            _ = ticket.token.cancelled() => return Err(ticket.superseded()),
            _ = tokio::time::sleep(policy.interval) => {}
        }
        tokio::select! {
            _ = ticket.token.cancelled() => return Err(ticket.superseded()),
            _ = refresh() => {}
        }
        attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn policy(max_attempts: u32) -> ConvergencePolicy {
        ConvergencePolicy {
            interval: Duration::from_millis(1000),
            max_attempts,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_converges_after_k_polls() {
        let requests = PlayRequests::default();
        let ticket = requests.begin("spotify:track:x");
        let polls = Cell::new(0u32);

        let start = tokio::time::Instant::now();
        let attempts = wait_until_current(
            policy(15),
            &ticket,
            || polls.get() >= 3,
            || {
                polls.set(polls.get() + 1);
                async {}
            },
        )
        .await
        .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(polls.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_current_needs_no_poll() {
        let requests = PlayRequests::default();
        let ticket = requests.begin("spotify:track:x");
        let attempts = wait_until_current(policy(15), &ticket, || true, || async {})
            .await
            .unwrap();
        assert_eq!(attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let requests = PlayRequests::default();
        let ticket = requests.begin("spotify:track:x");
        let polls = Cell::new(0u32);

        let err = wait_until_current(
            policy(4),
            &ticket,
            || false,
            || {
                polls.set(polls.get() + 1);
                async {}
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(polls.get(), 4);
        match err {
            ControlError::ConvergenceTimeout { uri, attempts } => {
                assert_eq!(uri, "spotify:track:x");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_begin_supersedes_previous() {
        let requests = PlayRequests::default();
        let first = requests.begin("a");
        let second = requests.begin("b");

        assert!(first.is_superseded());
        assert!(!second.is_superseded());
        assert!(second.generation > first.generation);

        // La fin d'une demande périmée ne retire pas la plus récente
        requests.finish(&first);
        assert!(requests.has_active());
        requests.finish(&second);
        assert!(!requests.has_active());
    }

    #[test]
    fn test_same_uri_joins_pending_wait() {
        let requests = PlayRequests::default();
        let first = requests.begin("a");
        let again = requests.begin("a");

        assert!(!first.is_superseded());
        assert_eq!(first.generation, again.generation);

        // L'attente reste active tant qu'un appelant n'a pas terminé
        requests.finish(&first);
        assert!(requests.has_active());

        let other = requests.begin("b");
        assert!(again.is_superseded());
        assert!(!other.is_superseded());
        requests.finish(&again);
        assert!(requests.has_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_wait_stops() {
        let requests = PlayRequests::default();
        let ticket = requests.begin("a");

        let wait = wait_until_current(policy(15), &ticket, || false, || async {});
        let supersede = async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            requests.begin("b");
        };

        let (result, _) = tokio::join!(wait, supersede);
        assert!(result.unwrap_err().is_superseded());
    }
}
