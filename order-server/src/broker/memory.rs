//! In-memory Message Source
//!
//! Channel-backed [`MessageSource`] for tests and local runs. The sender
//! half records committed offsets so tests can assert acknowledgment
//! behavior; dropping the sender closes the source, which the receiver
//! reports as cancellation.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Delivery, MessageSource, Position, SourceError};

const MEMORY_TOPIC: &str = "memory";

/// Producer half of an in-memory source
#[derive(Clone)]
pub struct MemorySender {
    tx: mpsc::UnboundedSender<Delivery>,
    next_offset: Arc<AtomicI64>,
    committed: Arc<Mutex<Vec<i64>>>,
}

impl MemorySender {
    /// Publish one raw message, returning its offset
    pub fn send(&self, key: Option<&str>, payload: impl Into<Vec<u8>>) -> i64 {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        let delivery = Delivery {
            key: key.map(str::to_owned),
            payload: payload.into(),
            position: Position {
                topic: MEMORY_TOPIC.to_string(),
                partition: 0,
                offset,
            },
        };
        // receiver dropped — message goes nowhere, same as a closed broker
        let _ = self.tx.send(delivery);
        offset
    }

    /// Offsets committed by the consumer so far
    pub fn committed(&self) -> Vec<i64> {
        self.commit_log().offsets()
    }

    /// Probe for committed offsets that does not keep the channel open
    ///
    /// A [`MemorySender`] clone holds the channel open and prevents the
    /// consumer from observing closure; tests that need to assert commits
    /// after dropping the sender take a probe first.
    pub fn commit_log(&self) -> CommitLog {
        CommitLog(Arc::clone(&self.committed))
    }
}

/// Read-only view of the offsets a [`MemorySource`] has committed
#[derive(Clone)]
pub struct CommitLog(Arc<Mutex<Vec<i64>>>);

impl CommitLog {
    pub fn offsets(&self) -> Vec<i64> {
        self.0.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

/// Consumer half of an in-memory source
pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Delivery>,
    committed: Arc<Mutex<Vec<i64>>>,
}

impl MemorySource {
    /// Create a connected (sender, source) pair
    pub fn channel() -> (MemorySender, MemorySource) {
        let (tx, rx) = mpsc::unbounded_channel();
        let committed = Arc::new(Mutex::new(Vec::new()));
        (
            MemorySender {
                tx,
                next_offset: Arc::new(AtomicI64::new(0)),
                committed: Arc::clone(&committed),
            },
            MemorySource { rx, committed },
        )
    }
}

#[async_trait]
impl MessageSource for MemorySource {
    async fn receive(&mut self) -> Result<Delivery, SourceError> {
        // 发送端全部关闭视为取消：源不会再有消息
        self.rx.recv().await.ok_or(SourceError::Cancelled)
    }

    async fn commit(&mut self, delivery: &Delivery) -> Result<(), SourceError> {
        self.committed
            .lock()
            .map_err(|e| SourceError::Transient(e.to_string()))?
            .push(delivery.position.offset);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        self.rx.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_order_and_records_commits() {
        let (sender, mut source) = MemorySource::channel();
        sender.send(Some("A1"), b"p1".as_slice());
        sender.send(None, b"p2".as_slice());

        let first = source.receive().await.unwrap();
        assert_eq!(first.key.as_deref(), Some("A1"));
        assert_eq!(first.payload, b"p1");
        assert_eq!(first.position.offset, 0);

        let second = source.receive().await.unwrap();
        assert_eq!(second.position.offset, 1);

        source.commit(&first).await.unwrap();
        assert_eq!(sender.committed(), vec![0]);
    }

    #[tokio::test]
    async fn dropping_the_sender_cancels_the_source() {
        let (sender, mut source) = MemorySource::channel();
        drop(sender);
        assert!(matches!(
            source.receive().await,
            Err(SourceError::Cancelled)
        ));
    }
}
