// Rendezvous handoff between the access token loop and the ticket loop

use tokio::sync::{mpsc, oneshot};

/// Receiving side went away, nothing will consume published values
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("relay receiver closed")]
pub struct RelayClosed;

/// Create a connected sender/receiver pair
pub fn relay() -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (RelaySender { tx }, RelayReceiver { rx })
}

/// Publishing half, owned by the upstream loop
#[derive(Debug)]
pub struct RelaySender {
    tx: mpsc::Sender<(String, oneshot::Sender<()>)>,
}

impl RelaySender {
    /// Hand `value` to the receiver
    ///
    /// Completes only once the receiver has taken the value.
    pub async fn publish(&self, value: String) -> Result<(), RelayClosed> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send((value, ack_tx))
            .await
            .map_err(|_| RelayClosed)?;
        ack_rx.await.map_err(|_| RelayClosed)
    }
}

/// Receiving half, owned by the dependent loop
#[derive(Debug)]
pub struct RelayReceiver {
    rx: mpsc::Receiver<(String, oneshot::Sender<()>)>,
}

impl RelayReceiver {
    /// Wait for the next published value
    ///
    /// Returns `None` once the sender is dropped.
    pub async fn receive(&mut self) -> Option<String> {
        let (value, ack) = self.rx.recv().await?;
        // Publisher may have been cancelled mid-handoff; the value is still ours.
        let _ = ack.send(());
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, assert_ready_eq, task};

    #[tokio::test]
    async fn test_publish_blocks_until_received() {
        let (sender, mut receiver) = relay();

        let mut publish = task::spawn(sender.publish("token-1".to_string()));
        assert_pending!(publish.poll());
        assert_pending!(publish.poll());

        assert_eq!(receiver.receive().await, Some("token-1".to_string()));

        assert!(publish.is_woken());
        assert_ready_eq!(publish.poll(), Ok(()));
    }

    #[tokio::test]
    async fn test_receive_blocks_until_published() {
        let (sender, mut receiver) = relay();

        let mut receive = task::spawn(receiver.receive());
        assert_pending!(receive.poll());

        let mut publish = task::spawn(sender.publish("token-1".to_string()));
        assert_pending!(publish.poll());

        assert!(receive.is_woken());
        assert_ready_eq!(receive.poll(), Some("token-1".to_string()));
        drop(receive);

        assert_ready!(publish.poll()).unwrap();
    }

    #[tokio::test]
    async fn test_values_arrive_in_order() {
        let (sender, mut receiver) = relay();

        let producer = tokio::spawn(async move {
            for i in 1..=5 {
                sender.publish(format!("token-{}", i)).await.unwrap();
            }
        });

        for i in 1..=5 {
            assert_eq!(receiver.receive().await, Some(format!("token-{}", i)));
        }
        producer.await.unwrap();
        assert_eq!(receiver.receive().await, None);
    }

    #[tokio::test]
    async fn test_publish_fails_when_receiver_dropped() {
        let (sender, receiver) = relay();
        drop(receiver);
        assert_eq!(sender.publish("token".to_string()).await, Err(RelayClosed));
    }

    #[tokio::test]
    async fn test_receive_returns_none_when_sender_dropped() {
        let (sender, mut receiver) = relay();
        drop(sender);
        assert_eq!(receiver.receive().await, None);
    }
}
