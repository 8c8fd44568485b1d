//! HTTP client for the Spotify Web API playback endpoints
//!
//! The client is stateless apart from the bearer token: every method is a
//! single request/response exchange and nothing is retried or cached here.
//! Retry policy lives in the layers above (player store, pollers).
//!
//! # Example
//!
//! ```no_run
//! use platinespotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotifyClient::builder().token("BQD...").build()?;
//!
//!     if let Some(state) = client.get_state().await? {
//!         if let Some(track) = state.item {
//!             println!("{} - {}", track.artists_display(), track.name);
//!         }
//!     }
//!
//!     client.next().await?;
//!     Ok(())
//! }
//! ```

use crate::error::{Result, SpotifyError};
use crate::models::{Paging, PlayRequest, PlayerState, Track, UserProfile};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default Spotify Web API base URL
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Default timeout for HTTP requests (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "Platine/0.1.0 (platinespotify)";

/// Page size requested for album track listings (API maximum)
pub const ALBUM_TRACKS_PAGE_SIZE: u32 = 50;

/// Limit on followed `next` links, to bound the number of API calls
const MAX_ALBUM_PAGES: usize = 10;

/// Spotify Web API client
///
/// Cloning is cheap: clones share the connection pool and the bearer token,
/// so a token refreshed through [`SpotifyClient::set_token`] is seen by all
/// of them.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    token: Arc<RwLock<String>>,
    timeout: Duration,
}

impl SpotifyClient {
    /// Create a client with default settings and the given bearer token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder().token(token).build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the bearer token (obtained from the OAuth flow)
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    /// Current bearer token
    pub fn token(&self) -> String {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    // ========================================================================
    // Player
    // ========================================================================

    /// Fetch the playback state
    ///
    /// Returns `Ok(None)` when Spotify answers `204 No Content`, i.e. no
    /// device is currently active.
    pub async fn get_state(&self) -> Result<Option<PlayerState>> {
        let response = self.send(self.request(Method::GET, "/me/player")?).await?;

        if response.status() == StatusCode::NO_CONTENT {
            debug!("No active playback device");
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let state: PlayerState = serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse player state: {}", e);
            SpotifyError::Json(e)
        })?;
        Ok(Some(state))
    }

    /// Start or resume playback
    ///
    /// With `uris`, playback switches to those tracks. Success only means the
    /// command was accepted: the state change is observed later through
    /// [`SpotifyClient::get_state`].
    pub async fn play(&self, uris: Option<&[String]>) -> Result<()> {
        let body = PlayRequest { uris };
        let request = self.request(Method::PUT, "/me/player/play")?.json(&body);
        self.send(request).await.map(|_| ())
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        self.command(Method::PUT, "/me/player/pause").await
    }

    /// Skip to the next track
    pub async fn next(&self) -> Result<()> {
        self.command(Method::POST, "/me/player/next").await
    }

    /// Go back to the previous track
    pub async fn previous(&self) -> Result<()> {
        self.command(Method::POST, "/me/player/previous").await
    }

    /// Set the volume of the active device
    pub async fn set_volume(&self, percent: u8) -> Result<()> {
        if percent > 100 {
            return Err(SpotifyError::InvalidVolume(percent));
        }

        let mut url = self.endpoint("/me/player/volume")?;
        url.query_pairs_mut()
            .append_pair("volume_percent", &percent.to_string());

        let request = self.authorized(self.client.request(Method::PUT, url));
        self.send(request.json(&serde_json::json!({}))).await.map(|_| ())
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// List the tracks of an album, in album order
    ///
    /// Follows the `next` links of the paging object so that albums longer
    /// than one page are returned whole.
    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>> {
        let mut url = self.endpoint(&format!("/albums/{}/tracks", album_id))?;
        url.query_pairs_mut()
            .append_pair("limit", &ALBUM_TRACKS_PAGE_SIZE.to_string());

        let mut tracks = Vec::new();
        let mut next_url = Some(url);
        let mut pages_fetched = 0;

        while let Some(url) = next_url.take() {
            if pages_fetched >= MAX_ALBUM_PAGES {
                warn!(album_id, "Album has more than {} pages, truncating", MAX_ALBUM_PAGES);
                break;
            }

            let page: Paging<Track> = self.get_json(url).await?;
            pages_fetched += 1;
            tracks.extend(page.items);
            next_url = page.next.as_deref().map(Url::parse).transpose()?;
        }

        debug!(album_id, "Fetched {} album tracks", tracks.len());
        Ok(tracks)
    }

    /// Profile of the current user
    pub async fn current_user(&self) -> Result<UserProfile> {
        let url = self.endpoint("/me")?;
        self.get_json(url).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.api_base, path))?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token()).timeout(self.timeout)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        Ok(self.authorized(self.client.request(method, url)))
    }

    async fn command(&self, method: Method, path: &str) -> Result<()> {
        let request = self
            .request(method, path)?
            .json(&serde_json::json!({}));
        self.send(request).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let request = self.authorized(self.client.get(url));
        let response = self.send(request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            SpotifyError::Json(e)
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status, response.url().path());

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = api_error_message(&error_text);
            warn!("API error ({}): {}", status.as_u16(), message);
            return Err(SpotifyError::from_status_code(status.as_u16(), message));
        }

        Ok(response)
    }
}

/// Extrait `error.message` du corps d'erreur Spotify, sinon le texte brut
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Builder for configuring a SpotifyClient
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    token: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            token: String::new(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Use a custom reqwest::Client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL (mock servers in tests)
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SpotifyClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(SpotifyClient {
            client,
            api_base: self.api_base,
            token: Arc::new(RwLock::new(self.token)),
            timeout: self.timeout,
        })
    }
}
