//! Trait d'accès au lecteur distant
//!
//! `RemotePlayer` décrit les commandes de lecture dont a besoin la couche de
//! contrôle. `SpotifyClient` l'implémente ; les tests fournissent leurs propres
//! implémentations simulées.

use crate::client::SpotifyClient;
use crate::error::Result;
use crate::models::{PlayerState, Track};
use async_trait::async_trait;

/// Commandes de lecture sur un lecteur distant
///
/// Toutes les commandes sont « fire-and-forget » : un `Ok(())` signifie que la
/// commande a été acceptée, pas que l'état distant a déjà changé.
#[async_trait]
pub trait RemotePlayer: Send + Sync {
    /// État courant du lecteur (`None` si aucun appareil n'est actif)
    async fn get_state(&self) -> Result<Option<PlayerState>>;

    /// Lance la lecture, éventuellement sur une liste d'URIs
    async fn play(&self, uris: Option<&[String]>) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn next(&self) -> Result<()>;

    async fn previous(&self) -> Result<()>;

    /// Règle le volume (0-100)
    async fn set_volume(&self, percent: u8) -> Result<()>;

    /// Pistes d'un album, dans l'ordre renvoyé par le service
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>>;
}

#[async_trait]
impl RemotePlayer for SpotifyClient {
    async fn get_state(&self) -> Result<Option<PlayerState>> {
        SpotifyClient::get_state(self).await
    }

    async fn play(&self, uris: Option<&[String]>) -> Result<()> {
        SpotifyClient::play(self, uris).await
    }

    async fn pause(&self) -> Result<()> {
        SpotifyClient::pause(self).await
    }

    async fn next(&self) -> Result<()> {
        SpotifyClient::next(self).await
    }

    async fn previous(&self) -> Result<()> {
        SpotifyClient::previous(self).await
    }

    async fn set_volume(&self, percent: u8) -> Result<()> {
        SpotifyClient::set_volume(self, percent).await
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>> {
        SpotifyClient::album_tracks(self, album_id).await
    }
}
