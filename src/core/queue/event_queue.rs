// Bounded event queue with a drop-oldest overflow policy.
//
// Gateway listeners push from many tasks; one pipeline task pulls.
// Under sustained load we prefer fresh events over a growing backlog,
// so a push at capacity evicts the oldest entry instead of waiting.

use super::cancellation::CancellationToken;
use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::Notify;

/// Default number of pending events held before eviction starts.
pub const EVENT_QUEUE_CAPACITY: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Dequeue cancelled")]
    Cancelled,
}

/// A fixed-capacity FIFO shared between producers and a single consumer.
pub struct EventQueue<T> {
    // Lock-free ring; never grows past its initial allocation.
    buffer: ArrayQueue<T>,
    available: Notify,
    dropped: AtomicU64,
    // True while we are evicting; resets once the consumer takes an event.
    overflowing: AtomicBool,
}

impl<T> EventQueue<T> {
    /// Create a queue holding up to [`EVENT_QUEUE_CAPACITY`] events.
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    /// Create a queue with a custom capacity. A capacity of 0 is bumped to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: ArrayQueue::new(capacity.max(1)),
            available: Notify::new(),
            dropped: AtomicU64::new(0),
            overflowing: AtomicBool::new(false),
        }
    }

    /// Push an event. Never waits on the consumer.
    ///
    /// If the queue is full the oldest pending event is discarded first.
    pub fn queue(&self, event: T) {
        if self.buffer.force_push(event).is_some() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if !self.overflowing.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    capacity = self.capacity(),
                    dropped_total = dropped,
                    "Event queue is full; dropping oldest events"
                );
            } else {
                tracing::debug!(dropped_total = dropped, "Dropped oldest queued event");
            }
        }

        // Stores a permit if the consumer isn't waiting yet.
        self.available.notify_one();
    }

    /// Take the next event, waiting until one arrives or `token` fires.
    ///
    /// Events already buffered are returned even after cancellation so the
    /// caller decides when to stop draining.
    pub async fn dequeue(&self, token: &CancellationToken) -> Result<T, QueueError> {
        loop {
            if let Some(event) = self.try_dequeue() {
                return Ok(event);
            }

            if token.is_cancelled() {
                return Err(QueueError::Cancelled);
            }

            tokio::select! {
                _ = self.available.notified() => {}
                _ = token.cancelled() => {
                    // A push may have landed in the same instant.
                    return self.try_dequeue().ok_or(QueueError::Cancelled);
                }
            }
        }
    }

    /// Take the next event without waiting.
    pub fn try_dequeue(&self) -> Option<T> {
        let event = self.buffer.pop();
        if event.is_some() {
            self.overflowing.store(false, Ordering::Relaxed);
        }
        event
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// How many events were evicted since the queue was created.
    pub fn dropped_total(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::cancellation::CancellationSource;
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::with_capacity(10);
        for i in 0..5 {
            queue.queue(i);
        }

        let drained: Vec<i32> = std::iter::from_fn(|| queue.try_dequeue()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let queue = EventQueue::new();
        for i in 0..=EVENT_QUEUE_CAPACITY {
            queue.queue(i);
        }

        assert_eq!(queue.len(), EVENT_QUEUE_CAPACITY);
        assert_eq!(queue.dropped_total(), 1);

        let drained: Vec<usize> = std::iter::from_fn(|| queue.try_dequeue()).collect();
        assert_eq!(drained.len(), EVENT_QUEUE_CAPACITY);
        // The very first push was evicted
        assert_eq!(drained[0], 1);
        assert_eq!(*drained.last().unwrap(), EVENT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_sustained_overflow_keeps_newest() {
        let queue = EventQueue::with_capacity(3);
        for i in 0..10 {
            queue.queue(i);
        }

        assert_eq!(queue.dropped_total(), 7);
        let drained: Vec<i32> = std::iter::from_fn(|| queue.try_dequeue()).collect();
        assert_eq!(drained, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_dequeue_waits_for_push() {
        let queue = Arc::new(EventQueue::with_capacity(4));
        let source = CancellationSource::new();
        let token = source.token();

        let consumer = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.dequeue(&token).await }
        });

        // Give the consumer time to park on the empty queue
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.queue("hello");
        let received = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake")
            .unwrap();
        assert_eq!(received, Ok("hello"));
    }

    #[tokio::test]
    async fn test_dequeue_cancelled_on_empty_queue() {
        let queue: Arc<EventQueue<u32>> = Arc::new(EventQueue::with_capacity(4));
        let source = CancellationSource::new();
        let token = source.token();

        let consumer = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.dequeue(&token).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        source.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake")
            .unwrap();
        assert_eq!(result, Err(QueueError::Cancelled));
    }

    #[tokio::test]
    async fn test_buffered_events_survive_cancellation() {
        let queue = EventQueue::with_capacity(4);
        let source = CancellationSource::new();
        let token = source.token();

        queue.queue(1);
        source.cancel();

        assert_eq!(queue.dequeue(&token).await, Ok(1));
        assert_eq!(queue.dequeue(&token).await, Err(QueueError::Cancelled));
    }

    #[tokio::test]
    async fn test_concurrent_producers() {
        let queue = Arc::new(EventQueue::with_capacity(1000));
        let mut handles = Vec::new();
        for producer in 0..4u32 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    queue.queue((producer, i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(queue.len(), 400);

        // Per-producer order is preserved
        let drained: Vec<(u32, u32)> = std::iter::from_fn(|| queue.try_dequeue()).collect();
        for producer in 0..4u32 {
            let seq: Vec<u32> = drained
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(seq, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let queue = EventQueue::with_capacity(0);
        queue.queue('a');
        queue.queue('b');

        assert_eq!(queue.capacity(), 1);
        assert_eq!(queue.try_dequeue(), Some('b'));
        assert_eq!(queue.dropped_total(), 1);
    }

    #[tokio::test]
    async fn test_contended_overflow_accounts_for_every_event() {
        let queue = Arc::new(EventQueue::with_capacity(8));
        let source = CancellationSource::new();

        let consumer = tokio::spawn({
            let queue = Arc::clone(&queue);
            let token = source.token();
            async move {
                let mut seen: Vec<(u32, u32)> = Vec::new();
                while let Ok(event) = queue.dequeue(&token).await {
                    seen.push(event);
                }
                seen
            }
        });

        let mut producers = Vec::new();
        for producer in 0..4u32 {
            let queue = Arc::clone(&queue);
            producers.push(tokio::spawn(async move {
                for i in 0..5000u32 {
                    queue.queue((producer, i));
                    assert!(queue.len() <= 8);
                    if i % 64 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }
        for handle in producers {
            handle.await.unwrap();
        }
        source.cancel();

        let seen = tokio::time::timeout(Duration::from_secs(5), consumer)
            .await
            .expect("consumer should stop")
            .unwrap();
        assert_eq!(seen.len() as u64 + queue.dropped_total(), 20_000);

        // Evictions leave gaps but never reorder a producer's events
        for producer in 0..4u32 {
            let seq: Vec<u32> = seen
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, i)| *i)
                .collect();
            assert!(seq.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
