//! Integration tests for the RFID reader client

use platinecontrol::{ControlError, PlayerEvent, PlayerStore, RfidCardState, RfidClient, StoreOptions};
use platinespotify::SpotifyClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_card() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getCard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "card": "04A1B2C3",
            "cardPresent": true,
            "mode": "read"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RfidClient::new(&server.uri()).unwrap();
    let state = client.get_card().await.unwrap();

    assert_eq!(
        state,
        RfidCardState {
            card: "04A1B2C3".to_string(),
            card_present: true,
            mode: "read".to_string(),
        }
    );
}

#[tokio::test]
async fn test_reader_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getCard"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = RfidClient::new(&server.uri()).unwrap().get_card().await.unwrap_err();
    assert!(matches!(err, ControlError::RfidStatus(503)));
}

#[tokio::test]
async fn test_rfid_poller_feeds_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getCard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "card": "",
            "cardPresent": false,
            "mode": "idle"
        })))
        .mount(&server)
        .await;

    let spotify = SpotifyClient::builder()
        .api_base("http://127.0.0.1:9/v1")
        .build()
        .unwrap();
    let store = PlayerStore::with_player(spotify, StoreOptions::default());
    let mut events = store.subscribe();

    let reader = Arc::new(RfidClient::new(&server.uri()).unwrap());
    let poller = store.start_rfid_polling(reader, Duration::from_millis(50));

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    poller.stop().await;

    match event {
        PlayerEvent::CardChanged(state) => {
            assert!(!state.card_present);
            assert_eq!(state.mode, "idle");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(store.card_state().mode, "idle");
}
