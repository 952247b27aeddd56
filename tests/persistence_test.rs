use std::sync::Arc;
use std::time::Duration;

use jeehub::configs::{Database, SchemaManager, Storage};
use jeehub::models::Node;
use jeehub::radio::{NodeKind, Sensor};
use jeehub::repositories::NodeRepository;
use jeehub::services::{PersistenceWriter, WriteOp};

async fn setup_storage() -> Arc<Storage> {
    Arc::new(
        Storage::new(
            Database {
                url: String::from("sqlite::memory:"),
                clean_start: true,
            },
            SchemaManager::default(),
        )
        .await
        .unwrap(),
    )
}

fn node_with_temperature(raw: u64) -> Node {
    let mut node = Node::new(2, NodeKind::TinytxT);
    node.apply_raw(&[(Sensor::Temperature, raw), (Sensor::SupplyVoltage, 3000)]);
    node
}

async fn submit_sequence(writer: &PersistenceWriter) {
    writer
        .submit(WriteOp::InsertNode {
            id: 2,
            kind: NodeKind::TinytxT,
        })
        .await;
    writer.submit(WriteOp::UpdateNode(node_with_temperature(150))).await;
    writer.submit(WriteOp::UpdateNode(node_with_temperature(213))).await;
}

#[tokio::test]
async fn test_inline_writer_applies_in_order() {
    let storage = setup_storage().await;
    let writer = PersistenceWriter::inline(storage.clone());

    submit_sequence(&writer).await;

    let nodes = NodeRepository::new(storage).load_all().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].temperature, Some(21.3));
}

#[tokio::test]
async fn test_queued_writer_matches_sequential_application() {
    let inline_storage = setup_storage().await;
    submit_sequence(&PersistenceWriter::inline(inline_storage.clone())).await;

    let queued_storage = setup_storage().await;
    let writer = PersistenceWriter::spawn(queued_storage.clone());
    submit_sequence(&writer).await;

    // the drain task applies asynchronously; poll until it catches up
    let repo = NodeRepository::new(queued_storage);
    let mut queued_nodes = Vec::new();
    for _ in 0..100 {
        queued_nodes = repo.load_all().await.unwrap();
        if queued_nodes.first().and_then(|node| node.temperature) == Some(21.3) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let inline_nodes = NodeRepository::new(inline_storage).load_all().await.unwrap();
    assert_eq!(queued_nodes.len(), inline_nodes.len());
    // FIFO: the later update wins in both modes
    assert_eq!(queued_nodes[0].temperature, inline_nodes[0].temperature);
    assert_eq!(queued_nodes[0].temperature, Some(21.3));
    assert_eq!(queued_nodes[0].vcc, inline_nodes[0].vcc);
}
