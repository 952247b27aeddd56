use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

const COMMAND_QUEUE_DEPTH: usize = 64;

/// Outbound buffer slots per subscriber before it counts as too slow.
pub const SUBSCRIBER_BUFFER: usize = 256;

enum Command {
    Register {
        id: Uuid,
        outbound: mpsc::Sender<Vec<u8>>,
    },
    Unregister {
        id: Uuid,
    },
    Broadcast {
        payload: Vec<u8>,
    },
}

/// Fan-out point for live subscriber connections.
///
/// A single coordinator task owns the subscriber map, so the set is never
/// observed half-updated; everyone else talks to it through a command
/// channel. Broadcasts never wait on a subscriber: a full outbound buffer
/// gets the subscriber evicted and its buffer closed, which its connection
/// handler observes as end-of-stream.
pub struct Hub {
    commands: mpsc::Sender<Command>,
    buffer: usize,
}

impl Hub {
    pub fn spawn(buffer: usize) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        tokio::spawn(Self::coordinate(rx));

        Self { commands, buffer }
    }

    async fn coordinate(mut commands: mpsc::Receiver<Command>) {
        let mut subscribers: HashMap<Uuid, mpsc::Sender<Vec<u8>>> = HashMap::new();

        while let Some(command) = commands.recv().await {
            match command {
                Command::Register { id, outbound } => {
                    subscribers.insert(id, outbound);
                    tracing::debug!("subscriber {id} registered ({})", subscribers.len());
                }
                Command::Unregister { id } => {
                    subscribers.remove(&id);
                    tracing::debug!("subscriber {id} unregistered ({})", subscribers.len());
                }
                Command::Broadcast { payload } => {
                    subscribers.retain(|id, outbound| {
                        match outbound.try_send(payload.clone()) {
                            Ok(()) => true,
                            Err(TrySendError::Full(_)) => {
                                tracing::warn!("dropping slow subscriber {id}");
                                false
                            }
                            Err(TrySendError::Closed(_)) => false,
                        }
                    });
                }
            }
        }
    }

    /// Register a connection; the returned receiver yields broadcast
    /// payloads until the subscriber unregisters or is evicted.
    pub async fn register(&self) -> (Uuid, mpsc::Receiver<Vec<u8>>) {
        let id = Uuid::new_v4();
        let (outbound, rx) = mpsc::channel(self.buffer);

        let _ = self.commands.send(Command::Register { id, outbound }).await;

        (id, rx)
    }

    pub async fn unregister(&self, id: Uuid) {
        let _ = self.commands.send(Command::Unregister { id }).await;
    }

    pub async fn broadcast(&self, payload: Vec<u8>) {
        let _ = self.commands.send(Command::Broadcast { payload }).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_broadcasts_in_order() {
        let hub = Hub::spawn(8);
        let (_id, mut rx) = hub.register().await;

        hub.broadcast(b"first".to_vec()).await;
        hub.broadcast(b"second".to_vec()).await;

        assert_eq!(rx.recv().await.unwrap(), b"first");
        assert_eq!(rx.recv().await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn evicts_slow_subscribers_without_touching_others() {
        let hub = Hub::spawn(2);
        let (_slow_id, mut slow) = hub.register().await;
        let (_fast_id, mut fast) = hub.register().await;

        // the slow subscriber never drains, so two broadcasts fill its buffer
        hub.broadcast(vec![0]).await;
        hub.broadcast(vec![1]).await;
        assert_eq!(fast.recv().await.unwrap(), vec![0]);
        assert_eq!(fast.recv().await.unwrap(), vec![1]);

        // the next broadcast finds the slow buffer full and evicts it
        hub.broadcast(vec![2]).await;
        assert_eq!(fast.recv().await.unwrap(), vec![2]);

        assert_eq!(slow.recv().await.unwrap(), vec![0]);
        assert_eq!(slow.recv().await.unwrap(), vec![1]);
        // buffer closed on eviction, nothing more arrives
        assert_eq!(slow.recv().await, None);
    }

    #[tokio::test]
    async fn unregistered_subscribers_stop_receiving() {
        let hub = Hub::spawn(8);
        let (id, mut rx) = hub.register().await;

        hub.unregister(id).await;
        hub.broadcast(b"late".to_vec()).await;

        assert_eq!(rx.recv().await, None);
    }
}
