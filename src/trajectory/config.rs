use crate::error::ConfigError;
use crate::strategy::{LinkStrategyKind, SafeHeight, TouchStrategyKind, DEFAULT_SAFE_HEIGHT};

/// Settings for a [`TrajectoryBuilder`](super::TrajectoryBuilder).
///
/// The default uses normal touch moves on both ends and offset links at
/// [`DEFAULT_SAFE_HEIGHT`], built sequentially.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    /// Standoff distance for touch moves and link clearance.
    pub safe_height: f64,
    /// Shape of the approach move before each tape.
    pub landing: TouchStrategyKind,
    /// Shape of the departure move after each tape.
    pub takeoff: TouchStrategyKind,
    /// Shape of the moves between tapes and plies.
    pub link: LinkStrategyKind,
    /// Build tape and ply bodies on the rayon thread pool.
    pub parallel: bool,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            safe_height: DEFAULT_SAFE_HEIGHT,
            landing: TouchStrategyKind::Normal,
            takeoff: TouchStrategyKind::Normal,
            link: LinkStrategyKind::Offset,
            parallel: false,
        }
    }
}

impl TrajectoryConfig {
    #[must_use]
    pub fn with_safe_height(mut self, safe_height: f64) -> Self {
        self.safe_height = safe_height;
        self
    }

    #[must_use]
    pub fn with_landing(mut self, kind: TouchStrategyKind) -> Self {
        self.landing = kind;
        self
    }

    #[must_use]
    pub fn with_takeoff(mut self, kind: TouchStrategyKind) -> Self {
        self.takeoff = kind;
        self
    }

    #[must_use]
    pub fn with_link(mut self, kind: LinkStrategyKind) -> Self {
        self.link = kind;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the numeric settings, returning the validated safe height.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveSafeHeight`] if the safe height is
    /// not positive.
    pub fn validate(&self) -> Result<SafeHeight, ConfigError> {
        SafeHeight::new(self.safe_height)
    }
}
