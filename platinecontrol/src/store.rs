//! Store de lecture : copie locale de l'état Spotify et commandes
//!
//! Le store est la seule source de vérité côté télécommande. L'état distant
//! y entre par le polling (`refresh`), les commandes y posent des valeurs
//! optimistes marquées `pending` que le poll suivant remplace.
//!
//! Un seul rafraîchissement s'exécute à la fois : un tick de polling qui
//! tombe pendant un rafraîchissement en cours est sauté, l'attente de
//! convergence de `play_track` fait la queue.

use crate::convergence::{wait_until_current, ConvergencePolicy, PlayRequests};
use crate::errors::{ControlError, Result};
use crate::poller::PollerHandle;
use crate::rfid::CardReader;
use crate::snapshot::{Pending, PlaybackSnapshot, PlayerEvent, PlayerView, RfidCardState};
use platinespotify::{PlayerState, RemotePlayer, Track};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreOptions {
    /// Période du polling de l'état
    pub poll_interval: Duration,
    pub convergence: ConvergencePolicy,
    /// Ignorer les demandes de volume à 0 (glissière relâchée à vide)
    pub ignore_zero_volume: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            convergence: ConvergencePolicy::default(),
            ignore_zero_volume: true,
        }
    }
}

struct StoreInner {
    remote: Arc<dyn RemotePlayer>,
    options: StoreOptions,
    playback: RwLock<PlaybackSnapshot>,
    card: RwLock<RfidCardState>,
    refresh_gate: Mutex<()>,
    play_requests: PlayRequests,
    events: broadcast::Sender<PlayerEvent>,
}

/// Store partagé ; les clones pointent vers le même état
#[derive(Clone)]
pub struct PlayerStore {
    inner: Arc<StoreInner>,
}

impl PlayerStore {
    pub fn new(remote: Arc<dyn RemotePlayer>, options: StoreOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                remote,
                options,
                playback: RwLock::new(PlaybackSnapshot::default()),
                card: RwLock::new(RfidCardState::default()),
                refresh_gate: Mutex::new(()),
                play_requests: PlayRequests::default(),
                events,
            }),
        }
    }

    pub fn with_player<P: RemotePlayer + 'static>(player: P, options: StoreOptions) -> Self {
        Self::new(Arc::new(player), options)
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    // ========================================================================
    // Lecture de l'état
    // ========================================================================

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.read_playback().clone()
    }

    pub fn card_state(&self) -> RfidCardState {
        self.inner
            .card
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            playback: self.snapshot(),
            rfid: self.card_state(),
        }
    }

    pub fn current_uri(&self) -> Option<String> {
        self.read_playback().current_uri().map(str::to_string)
    }

    /// Abonnement aux changements d'état
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.inner.events.subscribe()
    }

    // ========================================================================
    // Synchronisation
    // ========================================================================

    /// Récupère l'état distant et remplace le snapshot
    ///
    /// En cas d'échec le snapshot est laissé intact. Une réponse « aucun
    /// appareil actif » ne modifie rien non plus. Les pistes de l'album sont
    /// rechargées quand l'album de la piste courante change.
    pub async fn refresh(&self) -> Result<()> {
        let _gate = self.inner.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Tick de polling : sauté si un rafraîchissement est déjà en cours
    pub async fn poll_tick(&self) {
        let Ok(_gate) = self.inner.refresh_gate.try_lock() else {
            debug!("Refresh already in flight, skipping poll tick");
            return;
        };
        if let Err(err) = self.refresh_locked().await {
            warn!("Failed to poll playback state: {err}");
        }
    }

    /// Recharge les pistes d'un album
    pub async fn refresh_album_tracks(&self, album_id: &str) -> Result<()> {
        let tracks = self.inner.remote.album_tracks(album_id).await?;
        self.store_album_tracks(album_id, tracks);
        Ok(())
    }

    async fn refresh_locked(&self) -> Result<()> {
        let Some(state) = self.inner.remote.get_state().await? else {
            debug!("No active device, keeping previous state");
            return Ok(());
        };

        if let Some(album_id) = self.apply_state(state) {
            if let Err(err) = self.refresh_album_tracks(&album_id).await {
                warn!(album_id = %album_id, "Failed to fetch album tracks: {err}");
            }
        }
        Ok(())
    }

    /// Remplace le snapshot par l'état reçu ; renvoie l'album à recharger
    fn apply_state(&self, state: PlayerState) -> Option<String> {
        let mut events = Vec::new();

        let album_to_fetch = {
            let mut playback = self.write_playback();
            let volume = state
                .device_percent()
                .map(|percent| percent.min(100))
                .unwrap_or(playback.volume_percent);

            if playback.current_uri() != state.item.as_ref().map(|t| t.uri.as_str()) {
                events.push(PlayerEvent::TrackChanged {
                    track: state.item.clone(),
                });
            }
            if playback.is_playing != state.is_playing || playback.pending.playback {
                events.push(PlayerEvent::PlaybackChanged {
                    is_playing: state.is_playing,
                    pending: false,
                });
            }
            if playback.volume_percent != volume || playback.pending.volume {
                events.push(PlayerEvent::VolumeChanged {
                    percent: volume,
                    pending: false,
                });
            }

            playback.current_track = state.item;
            playback.is_playing = state.is_playing;
            playback.volume_percent = volume;
            playback.pending = Pending::default();

            if playback.album_tracks_stale() {
                playback.current_album_id().map(str::to_string)
            } else {
                None
            }
        };

        self.emit_all(events);
        album_to_fetch
    }

    fn store_album_tracks(&self, album_id: &str, tracks: Vec<Track>) {
        {
            let mut playback = self.write_playback();
            if let Some(current) = playback.current_album_id() {
                if current != album_id {
                    debug!(album_id, current, "Discarding tracks of a previous album");
                    return;
                }
            }
            playback.album_tracks = tracks.clone();
            playback.album_tracks_album_id = Some(album_id.to_string());
        }

        debug!(album_id, "Album tracks updated ({} tracks)", tracks.len());
        self.emit(PlayerEvent::AlbumTracksChanged {
            album_id: album_id.to_string(),
            tracks,
        });
    }

    // ========================================================================
    // Commandes
    // ========================================================================

    /// Bascule lecture/pause
    ///
    /// Le drapeau local est inversé avant l'appel distant ; l'échec de la
    /// commande est journalisé et le poll suivant rétablit la vérité.
    pub async fn toggle_playback(&self) {
        let was_playing = {
            let mut playback = self.write_playback();
            let was_playing = playback.is_playing;
            playback.is_playing = !was_playing;
            playback.pending.playback = true;
            was_playing
        };
        self.emit(PlayerEvent::PlaybackChanged {
            is_playing: !was_playing,
            pending: true,
        });

        let result = if was_playing {
            self.inner.remote.pause().await
        } else {
            self.inner.remote.play(None).await
        };
        if let Err(err) = result {
            warn!("Failed to toggle playback: {err}");
        }
    }

    pub async fn skip(&self) {
        if let Err(err) = self.inner.remote.next().await {
            warn!("Failed to skip to next track: {err}");
        }
    }

    pub async fn rewind(&self) {
        if let Err(err) = self.inner.remote.previous().await {
            warn!("Failed to go back to previous track: {err}");
        }
    }

    /// Demande un changement de volume
    ///
    /// Renvoie `Ok(false)` sans appel distant si la valeur est identique au
    /// volume local, ou nulle quand `ignore_zero_volume` est actif. Une
    /// valeur au-delà de 100 est refusée avec `InvalidVolume`. L'échec de la
    /// commande distante est seulement journalisé.
    pub async fn change_volume(&self, percent: u8) -> Result<bool> {
        if percent > 100 {
            return Err(ControlError::InvalidVolume(percent));
        }
        {
            let mut playback = self.write_playback();
            if percent == playback.volume_percent {
                return Ok(false);
            }
            if percent == 0 && self.inner.options.ignore_zero_volume {
                debug!("Ignoring zero volume request");
                return Ok(false);
            }
            playback.volume_percent = percent;
            playback.pending.volume = true;
        }
        self.emit(PlayerEvent::VolumeChanged {
            percent,
            pending: true,
        });

        if let Err(err) = self.inner.remote.set_volume(percent).await {
            warn!(percent, "Failed to set volume: {err}");
        }
        Ok(true)
    }

    /// Lance une piste et attend qu'elle devienne la piste courante
    ///
    /// Échoue avec `Remote` si la commande est refusée, `ConvergenceTimeout`
    /// si la piste n'apparaît pas dans la borne configurée, et `Superseded`
    /// si un autre `play_track` a été demandé entre-temps.
    pub async fn play_track(&self, uri: &str) -> Result<()> {
        let ticket = self.inner.play_requests.begin(uri);
        info!(uri, generation = ticket.generation, "Playing track");

        let uris = [uri.to_string()];
        if let Err(err) = self.inner.remote.play(Some(&uris)).await {
            self.inner.play_requests.finish(&ticket);
            return Err(err.into());
        }

        let store = self.clone();
        let result = wait_until_current(
            self.inner.options.convergence,
            &ticket,
            || self.read_playback().current_uri() == Some(uri),
            move || {
                let store = store.clone();
                async move {
                    if let Err(err) = store.refresh().await {
                        debug!("Poll while waiting for track failed: {err}");
                    }
                }
            },
        )
        .await;
        self.inner.play_requests.finish(&ticket);

        match result {
            Ok(attempts) => {
                debug!(uri, attempts, "Track is now playing");
                Ok(())
            }
            Err(err) => {
                warn!(uri, "Play request did not complete: {err}");
                Err(err)
            }
        }
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Lance le polling de l'état (premier poll immédiat)
    pub fn start_polling(&self) -> PollerHandle {
        let store = self.clone();
        PollerHandle::spawn("player-state", self.inner.options.poll_interval, move || {
            let store = store.clone();
            async move { store.poll_tick().await }
        })
    }

    /// Lance le polling du lecteur RFID
    pub fn start_rfid_polling(&self, reader: Arc<dyn CardReader>, period: Duration) -> PollerHandle {
        let store = self.clone();
        PollerHandle::spawn("rfid", period, move || {
            let store = store.clone();
            let reader = reader.clone();
            async move {
                match reader.read_card().await {
                    Ok(state) => {
                        store.update_card_state(state);
                    }
                    Err(err) => warn!("Failed to read RFID card state: {err}"),
                }
            }
        })
    }

    /// Remplace l'état de carte RFID ; renvoie `true` s'il a changé
    pub fn update_card_state(&self, state: RfidCardState) -> bool {
        {
            let mut card = self.inner.card.write().unwrap_or_else(|e| e.into_inner());
            if *card == state {
                return false;
            }
            *card = state.clone();
        }
        info!(card = %state.card, present = state.card_present, "RFID card changed");
        self.emit(PlayerEvent::CardChanged(state));
        true
    }

    // ========================================================================
    // Interne
    // ========================================================================

    fn read_playback(&self) -> RwLockReadGuard<'_, PlaybackSnapshot> {
        self.inner.playback.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_playback(&self) -> RwLockWriteGuard<'_, PlaybackSnapshot> {
        self.inner.playback.write().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: PlayerEvent) {
        // Pas d'abonné : rien à faire
        let _ = self.inner.events.send(event);
    }

    fn emit_all(&self, events: Vec<PlayerEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}
