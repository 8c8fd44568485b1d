//! État observable de la télécommande
//!
//! [`PlaybackSnapshot`] est la copie locale de l'état Spotify. Elle est
//! remplacée en bloc à chaque poll réussi ; les commandes ne font que poser
//! des valeurs optimistes marquées `pending` en attendant la confirmation.

use platinespotify::Track;
use serde::{Deserialize, Serialize};

/// Volume affiché avant le premier poll
pub const INITIAL_VOLUME_PERCENT: u8 = 50;

/// Valeurs optimistes pas encore confirmées par un poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pending {
    pub playback: bool,
    pub volume: bool,
}

impl Pending {
    pub fn any(&self) -> bool {
        self.playback || self.volume
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub volume_percent: u8,
    /// Pistes de l'album courant, dans l'ordre de l'album
    pub album_tracks: Vec<Track>,
    /// Album auquel appartiennent `album_tracks`
    pub album_tracks_album_id: Option<String>,
    pub pending: Pending,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            volume_percent: INITIAL_VOLUME_PERCENT,
            album_tracks: Vec::new(),
            album_tracks_album_id: None,
            pending: Pending::default(),
        }
    }
}

impl PlaybackSnapshot {
    pub fn current_uri(&self) -> Option<&str> {
        self.current_track.as_ref().map(|track| track.uri.as_str())
    }

    pub fn current_album_id(&self) -> Option<&str> {
        self.current_track.as_ref().and_then(Track::album_id)
    }

    /// Vrai quand les pistes d'album chargées ne correspondent pas à l'album
    /// de la piste courante
    pub fn album_tracks_stale(&self) -> bool {
        match self.current_album_id() {
            Some(album_id) => self.album_tracks_album_id.as_deref() != Some(album_id),
            None => false,
        }
    }
}

/// Réponse de `GET {rfid}/getCard`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfidCardState {
    #[serde(default)]
    pub card: String,
    #[serde(default)]
    pub card_present: bool,
    #[serde(default)]
    pub mode: String,
}

/// Vue complète exposée à l'interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub playback: PlaybackSnapshot,
    pub rfid: RfidCardState,
}

/// Changements diffusés aux abonnés du store
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// La piste courante a changé (`None` : plus rien en lecture)
    TrackChanged { track: Option<Track> },
    PlaybackChanged { is_playing: bool, pending: bool },
    VolumeChanged { percent: u8, pending: bool },
    AlbumTracksChanged { album_id: String, tracks: Vec<Track> },
    CardChanged(RfidCardState),
}
