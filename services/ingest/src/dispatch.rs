use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::events::CanonicalEvent;
use crate::sink::{EventSink, SinkError};

/// Buffered events are handed to the sink once this many have accumulated.
pub const FLUSH_THRESHOLD: usize = 2000;

/// Buffers translated events and flushes them to the sink in bulk.
///
/// A full buffer is snapshotted-and-cleared under the lock and handed to
/// the sink on a spawned task, fire-and-forget: producers keep enqueueing
/// while a flush is in flight, and flush failures are logged, never
/// retried here. `drain` waits for in-flight flushes, then sends whatever
/// remains (even below threshold) exactly once, surfacing that result.
pub struct BatchDispatcher {
    sink: Arc<dyn EventSink>,
    buffer: Mutex<Vec<CanonicalEvent>>,
    threshold: usize,
    flushes: Mutex<Vec<JoinHandle<()>>>,
}

impl BatchDispatcher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self::with_threshold(sink, FLUSH_THRESHOLD)
    }

    pub fn with_threshold(sink: Arc<dyn EventSink>, threshold: usize) -> Self {
        Self {
            sink,
            buffer: Mutex::new(Vec::new()),
            threshold,
            flushes: Mutex::new(Vec::new()),
        }
    }

    /// Append one event. If the buffer is already at the threshold, its
    /// contents are flushed first, so the new event starts a fresh batch.
    pub fn push(&self, event: CanonicalEvent) {
        let full = {
            let mut buffer = self.buffer.lock().expect("dispatcher buffer poisoned");
            let full = if buffer.len() >= self.threshold {
                Some(std::mem::take(&mut *buffer))
            } else {
                None
            };
            buffer.push(event);
            full
        };

        if let Some(batch) = full {
            let sink = Arc::clone(&self.sink);
            let count = batch.len();
            tracing::info!(count, "flushing event batch to sink");
            let handle = tokio::spawn(async move {
                if let Err(e) = sink.accept(batch).await {
                    tracing::error!(count, error = %e, "sink flush failed");
                }
            });
            self.flushes
                .lock()
                .expect("dispatcher flush list poisoned")
                .push(handle);
        }
    }

    /// Wait for in-flight flushes, then flush the remaining buffered events.
    /// Returns the number of events in the final flush.
    pub async fn drain(&self) -> Result<usize, SinkError> {
        let handles = std::mem::take(
            &mut *self.flushes.lock().expect("dispatcher flush list poisoned"),
        );
        for handle in handles {
            let _ = handle.await;
        }

        let remaining =
            std::mem::take(&mut *self.buffer.lock().expect("dispatcher buffer poisoned"));
        if remaining.is_empty() {
            return Ok(0);
        }

        let count = remaining.len();
        tracing::info!(count, "draining remaining events to sink");
        self.sink.accept(remaining).await?;
        Ok(count)
    }
}
