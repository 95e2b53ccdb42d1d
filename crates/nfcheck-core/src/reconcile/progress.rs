//! Progress events for the batch loop.

use crate::models::message::ProgressEvent;

/// Receiver of progress events. Implementations must return promptly; the
/// batch loop calls them inline.
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

/// Decides when the batch loop reports progress: every `interval` documents
/// and on the last one.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    total: usize,
    interval: usize,
    last_emitted: Option<usize>,
}

impl ProgressReporter {
    pub fn new(total: usize, interval: usize) -> Self {
        Self {
            total,
            interval: interval.max(1),
            last_emitted: None,
        }
    }

    /// Event for `processed` documents done, if it is a checkpoint.
    pub fn checkpoint(&self, processed: usize) -> Option<ProgressEvent> {
        if processed == 0 || processed > self.total {
            return None;
        }
        if processed % self.interval != 0 && processed != self.total {
            return None;
        }

        let percent = (processed * 100 / self.total) as u8;
        Some(ProgressEvent {
            percent,
            processed,
            total: self.total,
            status: format!("Processing... ({}/{})", processed, self.total),
        })
    }

    /// Emit the checkpoint event for `processed`, at most once per checkpoint.
    pub fn report(&mut self, processed: usize, sink: &mut dyn ProgressSink) {
        if self.last_emitted == Some(processed) {
            return;
        }
        if let Some(event) = self.checkpoint(processed) {
            self.last_emitted = Some(processed);
            sink.on_progress(event);
        }
    }
}
