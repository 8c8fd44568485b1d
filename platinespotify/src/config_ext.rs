//! Extension pour intégrer la configuration Spotify dans platineconfig
//!
//! Ce module fournit le trait `SpotifyConfigExt` qui ajoute à
//! `platineconfig::Config` la construction d'un client prêt à l'emploi.

use crate::client::SpotifyClient;
use crate::error::Result;
use platineconfig::Config;
use std::time::Duration;
use tracing::warn;

/// Trait d'extension pour construire le client Spotify depuis la configuration
///
/// # Exemple
///
/// ```rust,ignore
/// use platineconfig::get_config;
/// use platinespotify::SpotifyConfigExt;
///
/// let config = get_config();
/// let client = config.spotify_client()?;
/// ```
pub trait SpotifyConfigExt {
    /// Vérifie qu'un jeton d'accès est configuré
    fn has_spotify_token(&self) -> bool;

    /// Construit un `SpotifyClient` à partir de `spotify.*`
    ///
    /// Le jeton peut être vide : les requêtes échoueront alors en
    /// `Unauthorized` jusqu'à ce qu'il soit fourni via `set_token`.
    fn spotify_client(&self) -> Result<SpotifyClient>;
}

impl SpotifyConfigExt for Config {
    fn has_spotify_token(&self) -> bool {
        !self.get_spotify_access_token().trim().is_empty()
    }

    fn spotify_client(&self) -> Result<SpotifyClient> {
        if !self.has_spotify_token() {
            warn!("No Spotify access token configured (spotify.access_token)");
        }

        SpotifyClient::builder()
            .api_base(self.get_spotify_api_base())
            .token(self.get_spotify_access_token().trim())
            .timeout(Duration::from_millis(self.get_request_timeout_ms()))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert!(!config.has_spotify_token());

        config.set_spotify_access_token("tok").unwrap();
        config.set_spotify_api_base("http://127.0.0.1:9/v1").unwrap();
        config.set_request_timeout_ms(2500).unwrap();

        let client = config.spotify_client().unwrap();
        assert!(config.has_spotify_token());
        assert_eq!(client.token(), "tok");
        assert_eq!(client.api_base(), "http://127.0.0.1:9/v1");
        assert_eq!(client.timeout(), Duration::from_millis(2500));
    }
}
