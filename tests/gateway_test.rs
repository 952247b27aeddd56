use jeehub::radio::NodeKind;
use jeehub::repositories::NodeRepository;

use crate::common::mock_app::MockApp;

mod common;

// TinytxTh frame: temperature 21.3, humidity 58, vcc 2970 mV
const THL_LINE: &str = "OK 2 4 213 232 52 23";
// Same node id, colder reading: temperature -1.2, humidity 99, vcc 2801 mV
const COLD_LINE: &str = "OK 2 4 244 143 227 21";

#[tokio::test]
async fn test_frame_creates_and_updates_node() {
    let app = MockApp::new().await;

    app.ingest(THL_LINE).await;

    let node = app.registry.lookup(2).await.unwrap();
    assert_eq!(node.kind, NodeKind::TinytxTh);
    assert_eq!(node.temperature, Some(21.3));
    assert_eq!(node.humidity, Some(58));
    assert_eq!(node.vcc, Some(2970));
    assert!(node.last_seen_at.is_some());

    // the node was persisted with its readings
    let stored = NodeRepository::new(app.storage.clone()).load_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].temperature, Some(21.3));

    app.ingest(COLD_LINE).await;

    let node = app.registry.lookup(2).await.unwrap();
    assert_eq!(node.temperature, Some(-1.2));
    assert_eq!(node.humidity, Some(99));
    assert_eq!(node.vcc, Some(2801));
}

#[tokio::test]
async fn test_node_kind_is_immutable() {
    let app = MockApp::new().await;
    app.ingest(THL_LINE).await;

    // same id, now claiming to be a TinytxT with a 3-byte payload; the
    // payload no longer matches the registered kind and the frame drops
    app.ingest("OK 2 3 213 224 46").await;

    let node = app.registry.lookup(2).await.unwrap();
    assert_eq!(node.kind, NodeKind::TinytxTh);
    assert_eq!(node.temperature, Some(21.3));
}

#[tokio::test]
async fn test_noise_is_ignored() {
    let app = MockApp::new().await;

    app.ingest("GARBAGE").await;
    app.ingest("OK 3 9 1 2 3").await; // unknown kind code
    app.ingest("OK 3 131 1 2 3").await; // reserved bit set

    // none of those reached the registry
    assert!(app.registry.lookup(3).await.is_none());

    // a valid kind with a bad payload length registers the node (first
    // contact) but applies no readings
    app.ingest("OK 3 4 1 2").await;

    let node = app.registry.lookup(3).await.unwrap();
    assert_eq!(node.kind, NodeKind::TinytxTh);
    assert!(node.temperature.is_none());
    assert!(node.last_seen_at.is_none());
}

#[tokio::test]
async fn test_updates_are_broadcast_to_subscribers() {
    let app = MockApp::new().await;
    let (_id, mut subscriber) = app.hub.register().await;

    app.ingest(THL_LINE).await;

    let payload = subscriber.recv().await.unwrap();
    let line = String::from_utf8(payload).unwrap();
    assert_eq!(
        line,
        "[node 2][Unnamed] temperature: 21.3 | humidity: 58 | vcc: 2970"
    );
}
