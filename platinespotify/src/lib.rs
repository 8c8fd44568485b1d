//! # platinespotify - Client Spotify pour Platine
//!
//! Cette crate fournit un client Rust minimal pour les endpoints de lecture
//! de l'API Web Spotify, utilisé par la télécommande Platine.
//!
//! ## Vue d'ensemble
//!
//! - État du lecteur (`GET /me/player`)
//! - Commandes : lecture, pause, suivant, précédent, volume
//! - Liste des pistes d'un album, dans l'ordre de l'album
//! - Profil de l'utilisateur connecté
//!
//! Le client ne garde aucun état local (hormis le jeton bearer) et ne réessaie
//! jamais : la politique de relance appartient à `platinecontrol`.
//!
//! ## Structure des modules
//!
//! ```text
//! platinespotify/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client HTTP et builder
//! │   ├── remote.rs           # Trait RemotePlayer
//! │   ├── models.rs           # Structures de données
//! │   ├── config_ext.rs       # Extension platineconfig
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use platinespotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotifyClient::new("BQD...")?;
//!     let me = client.current_user().await?;
//!     println!("Hello, {}!", me.greeting_name());
//!
//!     client.play(Some(&["spotify:track:4uLU6hMCjMI75M1A2tKUQC".to_string()])).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod remote;

#[cfg(feature = "platineconfig")]
pub mod config_ext;

pub use client::{ClientBuilder, SpotifyClient, DEFAULT_API_BASE};
pub use error::{Result, SpotifyError};
pub use models::{AlbumRef, ArtistRef, Device, Image, Paging, PlayerState, Track, UserProfile};
pub use remote::RemotePlayer;

#[cfg(feature = "platineconfig")]
pub use config_ext::SpotifyConfigExt;
