//! Structures de données pour représenter les objets de l'API Spotify
//!
//! Seuls les champs utilisés par la télécommande sont décodés ; les autres
//! sont ignorés par serde.

use serde::{Deserialize, Deserializer, Serialize};

/// Désérialiseur flexible pour les IDs qui peuvent être des strings, des
/// integers ou `null` (pistes locales)
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::custom("ID must be a string or number")),
    }
}

/// Image (pochette d'album)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Référence d'artiste telle qu'embarquée dans une piste
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Référence d'album : identifiant et pochettes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Piste Spotify
///
/// Reçue telle quelle depuis l'API et jamais modifiée localement. Les pistes
/// renvoyées par `/albums/{id}/tracks` n'ont pas de champ `album`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub disc_number: Option<u32>,
}

impl Track {
    /// Identifiant de l'album de la piste, s'il est connu
    pub fn album_id(&self) -> Option<&str> {
        self.album
            .as_ref()
            .map(|album| album.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// URL de la première pochette de l'album
    pub fn album_image(&self) -> Option<&str> {
        self.album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|image| image.url.as_str())
    }

    /// Noms des artistes séparés par des virgules
    pub fn artists_display(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Appareil de lecture actif
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

/// Réponse de `GET /me/player`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<Track>,
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
}

impl PlayerState {
    /// Volume rapporté par l'appareil, s'il est présent
    pub fn device_percent(&self) -> Option<u8> {
        self.device.as_ref().and_then(|device| device.volume_percent)
    }
}

/// Page de résultats paginée (`items` + lien vers la page suivante)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Profil de l'utilisateur connecté (`GET /me`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

impl UserProfile {
    /// Nom à afficher, avec repli si l'utilisateur n'en a pas défini
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Spotify User")
    }
}

/// Corps de `PUT /me/player/play`
#[derive(Debug, Clone, Serialize, Default)]
pub(crate) struct PlayRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<&'a [String]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_state_with_track() {
        let state: PlayerState = serde_json::from_value(json!({
            "is_playing": true,
            "progress_ms": 1200,
            "device": { "id": "dev1", "name": "Kitchen", "is_active": true, "volume_percent": 42 },
            "item": {
                "id": "4uLU6hMCjMI75M1A2tKUQC",
                "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
                "name": "Fade to Black",
                "artists": [{ "id": "2ye2Wgw4gimLv2eAKyk1NB", "name": "Metallica" }],
                "album": {
                    "id": "3VfJFI3sAS4Ym5Q6h2Zt2v",
                    "name": "Ride the Lightning",
                    "images": [
                        { "url": "https://i.scdn.co/image/large", "height": 640, "width": 640 },
                        { "url": "https://i.scdn.co/image/small", "height": 64, "width": 64 }
                    ]
                }
            }
        }))
        .unwrap();

        assert!(state.is_playing);
        assert_eq!(state.device_percent(), Some(42));
        let track = state.item.unwrap();
        assert_eq!(track.album_id(), Some("3VfJFI3sAS4Ym5Q6h2Zt2v"));
        assert_eq!(track.album_image(), Some("https://i.scdn.co/image/large"));
        assert_eq!(track.artists_display(), "Metallica");
    }

    #[test]
    fn test_player_state_without_item() {
        let state: PlayerState =
            serde_json::from_value(json!({ "is_playing": false, "item": null })).unwrap();
        assert!(!state.is_playing);
        assert!(state.item.is_none());
        assert_eq!(state.device_percent(), None);
    }

    #[test]
    fn test_numeric_and_null_ids() {
        let track: Track = serde_json::from_value(json!({
            "id": 1, "uri": "a", "name": "One",
            "artists": [{ "id": null, "name": "Local" }, { "id": "x", "name": "Other" }]
        }))
        .unwrap();
        assert_eq!(track.id, "1");
        assert_eq!(track.album_id(), None);
        assert_eq!(track.artists_display(), "Local, Other");
    }

    #[test]
    fn test_play_request_body() {
        let uris = vec!["spotify:track:abc".to_string()];
        let body = serde_json::to_value(PlayRequest { uris: Some(&uris) }).unwrap();
        assert_eq!(body, json!({ "uris": ["spotify:track:abc"] }));

        let empty = serde_json::to_value(PlayRequest::default()).unwrap();
        assert_eq!(empty, json!({}));
    }

    #[test]
    fn test_greeting_name_fallback() {
        let profile: UserProfile = serde_json::from_value(json!({ "id": "u1" })).unwrap();
        assert_eq!(profile.greeting_name(), "Spotify User");
    }
}
