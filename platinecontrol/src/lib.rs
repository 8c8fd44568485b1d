//! # platinecontrol - Contrôle de lecture pour Platine
//!
//! Cette crate maintient la copie locale de l'état Spotify et expose les
//! commandes de la télécommande.
//!
//! ## Vue d'ensemble
//!
//! - [`PlayerStore`] : snapshot de lecture, polling, commandes optimistes
//! - [`wait_until_current`] : attente bornée et annulable après `play_track`
//! - [`PollerHandle`] : tâches périodiques arrêtées à la destruction du handle
//! - [`RfidClient`] : lecteur de cartes RFID en HTTP
//! - [`disk`] : répartition des pistes sur les faces A/B d'un vinyle
//! - [`turntable`] : rotation et retournement du disque
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use platinecontrol::{PlayerStore, StoreOptions};
//! use platinespotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpotifyClient::new("BQD...")?;
//!     let store = PlayerStore::with_player(client, StoreOptions::default());
//!     let poller = store.start_polling();
//!
//!     store.play_track("spotify:track:4uLU6hMCjMI75M1A2tKUQC").await?;
//!     println!("{:?}", store.snapshot().current_track);
//!
//!     poller.stop().await;
//!     Ok(())
//! }
//! ```

pub mod convergence;
pub mod disk;
pub mod errors;
pub mod poller;
pub mod rfid;
pub mod snapshot;
pub mod store;
pub mod turntable;

#[cfg(feature = "platineconfig")]
pub mod config_ext;

pub use convergence::{wait_until_current, ConvergencePolicy, PlayRequests, PlayTicket};
pub use disk::{disk_size, side_of, split_sides, wedge_at, DiskGeometry, DiskSide, Wedge};
pub use errors::{ControlError, Result};
pub use poller::PollerHandle;
pub use rfid::{CardReader, RfidClient};
pub use snapshot::{Pending, PlaybackSnapshot, PlayerEvent, PlayerView, RfidCardState};
pub use store::{PlayerStore, StoreOptions};
pub use turntable::{FlipState, SpinState};

#[cfg(feature = "platineconfig")]
pub use config_ext::{ControlConfigExt, RfidSettings};
