//! Ties the sample source to the metric channels.
//!
//! The controller never schedules itself. Its owner calls
//! [`DashboardController::data_cycle`] on a polling tick and
//! [`DashboardController::frame_cycle`] once per rendered frame.

use crate::client::{PollError, PollOutcome, SampleSource};
use crate::metrics::{ChannelDescriptor, MetricChannel, Snapshot};

/// What one data cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A fresh snapshot was ingested; `rejected` channels kept their old state.
    Updated { rejected: usize },
    NotDue,
    Transient { status: Option<u16> },
}

pub struct DashboardController {
    source: SampleSource,
    path: String,
    channels: Vec<MetricChannel>,
    reset_peaks_on_reconnect: bool,
    snapshots: u64,
}

impl DashboardController {
    pub fn new(
        source: SampleSource,
        path: impl Into<String>,
        channels: Vec<MetricChannel>,
    ) -> Self {
        Self {
            source,
            path: path.into(),
            channels,
            reset_peaks_on_reconnect: false,
            snapshots: 0,
        }
    }

    /// Controller with one channel per descriptor.
    pub fn with_descriptors(
        source: SampleSource,
        path: impl Into<String>,
        descriptors: Vec<ChannelDescriptor>,
        easing: f64,
    ) -> Self {
        let channels = descriptors
            .into_iter()
            .map(|d| MetricChannel::new(d, easing))
            .collect();
        Self::new(source, path, channels)
    }

    pub fn reset_peaks_on_reconnect(mut self, reset: bool) -> Self {
        self.reset_peaks_on_reconnect = reset;
        self
    }

    /// Poll once and, if a fresh snapshot came back, feed it to every channel.
    ///
    /// Only a fatal poll error is returned; the caller must stop polling.
    pub async fn data_cycle(&mut self) -> Result<CycleOutcome, PollError> {
        let outcome = self.source.poll(&self.path).await?;
        match outcome {
            PollOutcome::Snapshot(snapshot) => Ok(self.ingest(&snapshot)),
            PollOutcome::NotDue => Ok(CycleOutcome::NotDue),
            PollOutcome::Transient { status } => Ok(CycleOutcome::Transient { status }),
        }
    }

    /// Hand one snapshot to every channel. A channel that cannot read its
    /// section is skipped without affecting the rest.
    pub fn ingest(&mut self, snapshot: &Snapshot) -> CycleOutcome {
        let mut rejected = 0;
        for channel in &mut self.channels {
            if let Err(e) = channel.ingest(snapshot) {
                rejected += 1;
                tracing::debug!(
                    channel = channel.descriptor().title,
                    error = %e,
                    "channel kept previous value"
                );
            }
        }
        self.snapshots += 1;
        CycleOutcome::Updated { rejected }
    }

    /// Advance every animation one frame.
    pub fn frame_cycle(&mut self) {
        for channel in &mut self.channels {
            channel.tick();
        }
    }

    /// Replace the sample source, e.g. after a fatal error and a fresh login.
    /// The old session is torn down first.
    pub async fn reconnect(&mut self, source: SampleSource) {
        let old = std::mem::replace(&mut self.source, source);
        old.teardown().await;
        if self.reset_peaks_on_reconnect {
            self.reset_peaks();
        }
        tracing::info!(reset_peaks = self.reset_peaks_on_reconnect, "sample source replaced");
    }

    pub fn reset_peaks(&mut self) {
        for channel in &mut self.channels {
            channel.reset_peak();
        }
    }

    pub fn channels(&self) -> &[MetricChannel] {
        &self.channels
    }

    pub fn source(&self) -> &SampleSource {
        &self.source
    }

    /// Snapshots ingested so far.
    pub fn snapshot_count(&self) -> u64 {
        self.snapshots
    }

    pub async fn shutdown(self) {
        self.source.teardown().await;
    }
}
