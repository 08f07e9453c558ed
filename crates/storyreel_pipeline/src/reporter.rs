//! Progress sinks and the guard the orchestrator calls them through.

use std::panic::{AssertUnwindSafe, catch_unwind};
use storyreel_core::ProgressEvent;
use storyreel_interface::ProgressReporter;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Emits one structured log line per notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: &ProgressEvent) {
        info!(
            step = event.step(),
            total_steps = event.total_steps(),
            status = %event.status(),
            label = %event.label(),
            detail = %event.detail(),
            "Pipeline progress"
        );
    }
}

/// Forwards notifications to an unbounded channel without blocking.
///
/// # Examples
///
/// ```
/// use storyreel_core::{ProgressEvent, StageName};
/// use storyreel_interface::ProgressReporter;
/// use storyreel_pipeline::ChannelReporter;
///
/// let (reporter, mut events) = ChannelReporter::new();
/// reporter.report(&ProgressEvent::starting(StageName::Script, "Creating narrative structure"));
/// assert_eq!(*events.try_recv().unwrap().step(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end of its channel.
    pub fn new() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: &ProgressEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!(step = event.step(), "Progress receiver dropped");
        }
    }
}

/// Deliver `event`, containing any panic raised by the sink.
pub(crate) fn notify(reporter: &dyn ProgressReporter, event: ProgressEvent) {
    let delivered = catch_unwind(AssertUnwindSafe(|| reporter.report(&event)));
    if delivered.is_err() {
        warn!(
            step = event.step(),
            status = %event.status(),
            "Progress reporter panicked; notification dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use storyreel_core::StageName;

    struct Exploding;

    impl ProgressReporter for Exploding {
        fn report(&self, _event: &ProgressEvent) {
            panic!("sink exploded");
        }
    }

    #[test]
    fn test_panicking_reporter_is_contained() {
        notify(&Exploding, ProgressEvent::starting(StageName::Script, "detail"));
    }

    #[test]
    fn test_closure_reporter_receives_event() {
        let seen = Mutex::new(Vec::new());
        let reporter = |event: &ProgressEvent| seen.lock().unwrap().push(event.label().clone());
        notify(&reporter, ProgressEvent::completed(StageName::Audio, "narration.mp3"));
        assert_eq!(*seen.lock().unwrap(), vec!["Voiceover generated".to_string()]);
    }

    #[test]
    fn test_channel_reporter_survives_dropped_receiver() {
        let (reporter, receiver) = ChannelReporter::new();
        drop(receiver);
        reporter.report(&ProgressEvent::starting(StageName::Clips, "detail"));
    }
}
