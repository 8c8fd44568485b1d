//! Lecteur de cartes RFID exposé en HTTP
//!
//! Le lecteur répond à `GET {base}/getCard` avec
//! `{"card": "...", "cardPresent": true, "mode": "..."}`.

use crate::errors::{ControlError, Result};
use crate::snapshot::RfidCardState;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_RFID_POLL_INTERVAL: Duration = Duration::from_millis(1000);

const RFID_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Source d'état de carte RFID
#[async_trait]
pub trait CardReader: Send + Sync {
    async fn read_card(&self) -> Result<RfidCardState>;
}

#[derive(Debug, Clone)]
pub struct RfidClient {
    client: Client,
    endpoint: Url,
}

impl RfidClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(RFID_REQUEST_TIMEOUT).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let endpoint = Url::parse(&format!("{}/getCard", base_url.trim_end_matches('/')))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn get_card(&self) -> Result<RfidCardState> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::RfidStatus(status.as_u16()));
        }

        let state: RfidCardState = response.json().await?;
        debug!(card = %state.card, present = state.card_present, "RFID card state");
        Ok(state)
    }
}

#[async_trait]
impl CardReader for RfidClient {
    async fn read_card(&self) -> Result<RfidCardState> {
        self.get_card().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client = RfidClient::new("http://10.0.0.12:8080/").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://10.0.0.12:8080/getCard");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RfidClient::new("not a url").unwrap_err();
        assert!(matches!(err, ControlError::InvalidUrl(_)));
    }
}
