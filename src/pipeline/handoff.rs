//! Bounded producer → consumer channel with an explicit end-of-batch marker.
//!
//! The producer sends zero or more records and then [`HandoffSender::finish`], which consumes
//! the sender: a record after the marker, or a second marker, cannot be written. The consumer
//! tells a completed batch (marker seen) from a producer that vanished (channel closed first).

use tokio::sync::mpsc;

use crate::error::HandoffError;

/// One message on the channel.
#[derive(Debug, PartialEq, Eq)]
pub enum Handoff<T> {
    Record(T),
    /// No more records follow.
    Done,
}

/// Producer half.
#[derive(Debug)]
pub struct HandoffSender<T> {
    tx: mpsc::Sender<Handoff<T>>,
}

/// Consumer half.
#[derive(Debug)]
pub struct HandoffReceiver<T> {
    rx: mpsc::Receiver<Handoff<T>>,
    done: bool,
}

/// Channel holding at most `capacity` undelivered messages; `send` waits when it is full.
pub fn handoff<T>(capacity: usize) -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (HandoffSender { tx }, HandoffReceiver { rx, done: false })
}

impl<T> HandoffSender<T> {
    pub async fn send(&self, record: T) -> Result<(), HandoffError> {
        self.tx
            .send(Handoff::Record(record))
            .await
            .map_err(|_| HandoffError::ConsumerGone)
    }

    /// Send the end-of-batch marker.
    pub async fn finish(self) -> Result<(), HandoffError> {
        self.tx
            .send(Handoff::Done)
            .await
            .map_err(|_| HandoffError::ConsumerGone)
    }
}

impl<T> HandoffReceiver<T> {
    /// Next record; `Ok(None)` once the marker has been received.
    pub async fn recv(&mut self) -> Result<Option<T>, HandoffError> {
        if self.done {
            return Ok(None);
        }
        match self.rx.recv().await {
            Some(Handoff::Record(record)) => Ok(Some(record)),
            Some(Handoff::Done) => {
                self.done = true;
                self.rx.close();
                Ok(None)
            }
            None => Err(HandoffError::ClosedWithoutSentinel),
        }
    }

    /// True once the end-of-batch marker has been received.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_then_marker() {
        let (tx, mut rx) = handoff::<u32>(2);
        let producer = tokio::spawn(async move {
            for i in 0..5 {
                tx.send(i).await.unwrap();
            }
            tx.finish().await.unwrap();
        });

        let mut got = Vec::new();
        while let Some(v) = rx.recv().await.unwrap() {
            got.push(v);
        }
        producer.await.unwrap();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
        assert!(rx.is_done());
        assert_eq!(rx.recv().await, Ok(None));
    }

    #[tokio::test]
    async fn test_empty_batch_is_just_marker() {
        let (tx, mut rx) = handoff::<u32>(1);
        tx.finish().await.unwrap();
        assert_eq!(rx.recv().await, Ok(None));
    }

    #[tokio::test]
    async fn test_dropped_sender_without_marker() {
        let (tx, mut rx) = handoff::<u32>(4);
        tx.send(7).await.unwrap();
        drop(tx);
        assert_eq!(rx.recv().await, Ok(Some(7)));
        assert_eq!(rx.recv().await, Err(HandoffError::ClosedWithoutSentinel));
    }

    #[tokio::test]
    async fn test_send_after_consumer_gone() {
        let (tx, rx) = handoff::<u32>(4);
        drop(rx);
        assert_eq!(tx.send(1).await, Err(HandoffError::ConsumerGone));
    }
}
