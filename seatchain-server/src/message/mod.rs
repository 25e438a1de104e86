//! Live channel
//!
//! In-process broadcast bus for real-time notifications (check-in
//! dashboard). Publishing is fire-and-forget: with no subscribers the
//! message is dropped, and a send failure never propagates to the
//! publishing operation.

use shared::message::BusMessage;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct LiveChannel {
    tx: broadcast::Sender<BusMessage>,
}

impl LiveChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a message; never fails
    pub fn publish<T: serde::Serialize>(&self, topic: &str, payload: &T) {
        let value = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(topic, error = %e, "Dropping unserializable live message");
                return;
            }
        };
        let message = BusMessage::new(topic, value);
        // Err just means no subscriber is listening right now
        if self.tx.send(message).is_err() {
            tracing::debug!(topic, "No live subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LiveChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let channel = LiveChannel::new();
        channel.publish("event/1/checkin", &serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn subscribers_receive_published_messages() {
        let channel = LiveChannel::new();
        let mut rx = channel.subscribe();
        channel.publish("event/1/checkin", &serde_json::json!({"tokenId": 3}));

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, "event/1/checkin");
        assert_eq!(msg.payload["tokenId"], 3);
    }
}
