//! Observational sink for progress notifications.

use storyreel_core::ProgressEvent;

/// Receives a notification before and after each pipeline stage.
///
/// Reporters are purely observational: they cannot return errors and must
/// return quickly. The orchestrator guards each call, so a panicking
/// reporter is logged and ignored rather than aborting the run.
///
/// Any `Fn(&ProgressEvent)` closure is a reporter.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use storyreel_core::{ProgressEvent, StageName};
/// use storyreel_interface::ProgressReporter;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = {
///     let seen = seen.clone();
///     move |event: &ProgressEvent| seen.lock().unwrap().push(*event.step())
/// };
///
/// sink.report(&ProgressEvent::starting(StageName::Script, "Creating narrative structure"));
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Handle one notification.
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}
