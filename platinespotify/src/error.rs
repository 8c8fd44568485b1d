//! Gestion des erreurs pour le client Spotify

use thiserror::Error;

/// Type Result personnalisé pour platinespotify
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Erreurs possibles lors de l'utilisation du client Spotify
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Échec de transport (DNS, connexion, timeout...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Jeton bearer expiré ou invalide (401/403)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Ressource non trouvée (album, device, etc.)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Quota dépassé (rate limiting)
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    /// Erreur renvoyée par l'API Spotify
    #[error("Spotify API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL invalide
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Volume hors de l'intervalle [0, 100]
    #[error("Invalid volume: {0} (must be 0-100)")]
    InvalidVolume(u8),

    /// Erreur générique
    #[error("Spotify error: {0}")]
    Other(String),
}

impl SpotifyError {
    /// Crée une erreur depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimited,
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Vérifie si l'erreur provient d'un jeton expiré ou invalide
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SpotifyError::Unauthorized(_))
    }

    /// Vérifie si l'erreur est un échec de transport
    pub fn is_network_error(&self) -> bool {
        matches!(self, SpotifyError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert!(SpotifyError::from_status_code(401, "The access token expired").is_auth_error());
        assert!(SpotifyError::from_status_code(403, "Forbidden").is_auth_error());
        assert!(matches!(
            SpotifyError::from_status_code(404, "Player command failed: No active device found"),
            SpotifyError::NotFound(_)
        ));
        assert!(matches!(
            SpotifyError::from_status_code(429, ""),
            SpotifyError::RateLimited
        ));
        assert!(matches!(
            SpotifyError::from_status_code(502, "Bad gateway"),
            SpotifyError::ApiError { code: 502, .. }
        ));
    }
}
