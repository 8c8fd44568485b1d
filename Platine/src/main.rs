use platineconfig::get_config;
use platinecontrol::{
    ControlConfigExt, DiskGeometry, DiskSide, PlayerEvent, PlayerStore, PollerHandle,
};
use platinespotify::{SpotifyClient, SpotifyConfigExt, Track};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration et logs ==========

    let config = get_config();
    init_logging(&config.get_log_min_level());
    info!("📁 Configuration directory: {}", config.dir());

    let client = config.spotify_client()?;
    greet(&client).await;

    // ========== PHASE 2 : Store et polling ==========

    let store = PlayerStore::with_player(client, config.store_options());
    let geometry = config.disk_geometry();
    let events = tokio::spawn(log_events(store.clone(), geometry));

    let mut pollers: Vec<PollerHandle> = vec![store.start_polling()];
    info!(
        "🔄 Polling playback state every {:?}",
        store.options().poll_interval
    );

    match config.rfid_client() {
        Ok(Some((reader, period))) => {
            info!("🏷️ Polling RFID reader at {}", reader.endpoint());
            pollers.push(store.start_rfid_polling(Arc::new(reader), period));
        }
        Ok(None) => info!("RFID reader disabled"),
        Err(e) => warn!("⚠️ Failed to set up RFID reader: {}", e),
    }

    // ========== PHASE 3 : Attente ==========

    info!("✅ Platine is ready!");
    info!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down");

    for poller in pollers {
        poller.stop().await;
    }
    events.abort();

    Ok(())
}

/// RUST_LOG prime sur `host.logger.min_level`
fn init_logging(min_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(min_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn greet(client: &SpotifyClient) {
    match client.current_user().await {
        Ok(me) => info!("👋 Hello, {}!", me.greeting_name()),
        Err(e) if e.is_auth_error() => warn!("⚠️ Spotify token rejected: {}", e),
        Err(e) => warn!("⚠️ Failed to fetch Spotify profile: {}", e),
    }
}

async fn log_events(store: PlayerStore, geometry: DiskGeometry) {
    let mut events = store.subscribe();

    loop {
        match events.recv().await {
            Ok(PlayerEvent::TrackChanged { track: Some(track) }) => {
                info!("🎵 Now playing: {} - {}", track.artists_display(), track.name);
            }
            Ok(PlayerEvent::TrackChanged { track: None }) => info!("⏹️ Nothing playing"),
            Ok(PlayerEvent::PlaybackChanged { is_playing, pending }) => {
                info!(pending, "{}", if is_playing { "▶️ Playing" } else { "⏸️ Paused" });
            }
            Ok(PlayerEvent::VolumeChanged { percent, pending }) => {
                info!(pending, "🔊 Volume {}%", percent);
            }
            Ok(PlayerEvent::AlbumTracksChanged { album_id, tracks }) => {
                info!(album_id = %album_id, "💿 Album loaded ({} tracks)", tracks.len());
                let current = store.current_uri();
                log_side(&geometry, &tracks, DiskSide::A, current.as_deref());
                log_side(&geometry, &tracks, DiskSide::B, current.as_deref());
            }
            Ok(PlayerEvent::CardChanged(card)) if card.card_present => {
                info!(mode = %card.mode, "🏷️ Card {} on reader", card.card);
            }
            Ok(PlayerEvent::CardChanged(_)) => info!("🏷️ Reader empty"),
            Err(RecvError::Lagged(skipped)) => warn!("Event log lagging, {} events skipped", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

fn log_side(geometry: &DiskGeometry, tracks: &[Track], side: DiskSide, current: Option<&str>) {
    for wedge in geometry.layout_side(tracks, side, current) {
        info!(
            "  {}{} {:>5.1}° {}{}",
            side,
            wedge.index + 1,
            wedge.angle_degrees,
            wedge.track.name,
            if wedge.is_current { "  ◀" } else { "" }
        );
    }
}
