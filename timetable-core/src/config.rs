//! Build configuration for the assembly pipeline.
//!
//! All display and ordering toggles are passed in explicitly; nothing in
//! the pipeline reads ambient state.

use crate::domain::RailTime;

/// Whether cancelled times participate in column-ordering constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelledTimePolicy {
    /// Cancelled times always constrain column order
    #[default]
    Always,
    /// A cancelled time constrains only when every stop of that train is
    /// cancelled (so the column has nothing better to sort by)
    FullyCancelledOnly,
}

/// Configuration for the matrix builder and column sequencer.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Use realtime (predicted/actual) times where the train is
    /// realtime-activated; otherwise cells show the public schedule only.
    pub realtime_enabled: bool,

    /// Attach platform annotations to cells.
    pub show_platforms: bool,

    /// Cancelled-time ordering policy.
    pub cancelled_times: CancelledTimePolicy,

    /// Query time window; when set, trains whose displayed corridor calls
    /// fall outside it are filtered out of the matrix.
    pub time_window: Option<(RailTime, RailTime)>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            realtime_enabled: false,
            show_platforms: false,
            cancelled_times: CancelledTimePolicy::default(),
            time_window: None,
        }
    }
}

impl BuildConfig {
    /// Schedule-only configuration (the default).
    pub fn schedule_only() -> Self {
        Self::default()
    }

    /// Configuration with realtime display enabled.
    pub fn with_realtime() -> Self {
        Self {
            realtime_enabled: true,
            ..Self::default()
        }
    }

    /// Returns a copy restricted to the given time window.
    pub fn windowed(mut self, start: RailTime, end: RailTime) -> Self {
        self.time_window = Some((start, end));
        self
    }

    /// True when a time falls inside the configured window (or no window
    /// is configured).
    pub fn in_window(&self, time: RailTime) -> bool {
        match self.time_window {
            Some((start, end)) => time >= start && time <= end,
            None => true,
        }
    }
}
