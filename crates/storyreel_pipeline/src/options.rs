//! Per-run overrides.

use std::sync::Arc;
use storyreel_interface::ProgressReporter;

/// Options for a single [`Pipeline::run`](crate::Pipeline::run).
///
/// Every field is optional. Scene count and duration override the pipeline
/// defaults for this run only; a missing reporter behaves like
/// [`NoopReporter`](crate::NoopReporter).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use storyreel_pipeline::{RunOptions, TracingReporter};
///
/// let options = RunOptions::builder()
///     .scene_count(3u32)
///     .scene_duration(4.0)
///     .output_filename("rainbows.mp4")
///     .reporter(Arc::new(TracingReporter))
///     .build()
///     .unwrap();
/// assert_eq!(*options.scene_count(), Some(3));
/// assert!(options.reporter().is_some());
/// ```
#[derive(Clone, Default, derive_builder::Builder, derive_getters::Getters)]
#[builder(default, setter(strip_option))]
pub struct RunOptions {
    /// Final video filename inside the output directory
    #[builder(setter(into, strip_option))]
    output_filename: Option<String>,
    /// Number of scenes to plan
    scene_count: Option<u32>,
    /// Seconds per scene
    scene_duration: Option<f64>,
    /// Progress sink
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl RunOptions {
    /// Start building options.
    pub fn builder() -> RunOptionsBuilder {
        RunOptionsBuilder::default()
    }
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("output_filename", &self.output_filename)
            .field("scene_count", &self.scene_count)
            .field("scene_duration", &self.scene_duration)
            .field("reporter", &self.reporter.as_ref().map(|_| "<reporter>"))
            .finish()
    }
}
