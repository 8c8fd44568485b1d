//! Erreurs de la couche de contrôle

use platinespotify::SpotifyError;
use thiserror::Error;

/// Type Result de platinecontrol
pub type Result<T> = std::result::Result<T, ControlError>;

#[derive(Debug, Error)]
pub enum ControlError {
    /// Échec d'un appel au lecteur distant
    #[error("Remote player error: {0}")]
    Remote(#[from] SpotifyError),

    /// Échec de transport vers le lecteur RFID
    #[error("RFID reader error: {0}")]
    Rfid(#[from] reqwest::Error),

    /// Le lecteur RFID a répondu avec un statut non-2xx
    #[error("RFID reader returned HTTP status {0}")]
    RfidStatus(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// La piste demandée n'est pas devenue courante dans la borne configurée
    #[error("Track {uri} did not become current after {attempts} polls")]
    ConvergenceTimeout { uri: String, attempts: u32 },

    /// Une commande `play_track` plus récente a remplacé cette attente
    #[error("Wait for track {uri} superseded by a newer play command")]
    Superseded { uri: String },

    /// Volume hors de l'intervalle [0, 100]
    #[error("Invalid volume: {0} (must be 0-100)")]
    InvalidVolume(u8),
}

impl ControlError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ControlError::ConvergenceTimeout { .. })
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ControlError::Superseded { .. })
    }
}
