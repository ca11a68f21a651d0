// Event queue - the hand-off between gateway listeners and the pipeline.

pub mod cancellation;
pub mod event_queue;

pub use cancellation::{CancellationSource, CancellationToken};
pub use event_queue::{EventQueue, QueueError};
