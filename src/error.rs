use std::fmt;

use thiserror::Error;

/// Top-level error type for tool path generation.
#[derive(Debug, Error)]
pub enum TapepathError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layup(#[from] LayupError),

    /// A failure raised while building a specific part of a trajectory.
    #[error("{location}: {source}")]
    Build {
        location: BuildLocation,
        source: Box<TapepathError>,
    },
}

impl TapepathError {
    /// Wraps the error with the place in the pass hierarchy where it occurred.
    #[must_use]
    pub fn located(self, location: BuildLocation) -> Self {
        Self::Build {
            location,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any build context.
    #[must_use]
    pub fn root_cause(&self) -> &TapepathError {
        match self {
            Self::Build { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the outermost build location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&BuildLocation> {
        match self {
            Self::Build { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("projection failed: {0}")]
    Projection(String),

    #[error("intersection failed: {0}")]
    Intersection(String),

    #[error("degenerate link: {0}")]
    DegenerateLink(String),
}

/// Errors in strategy or builder parameters, raised before any build.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("safe height must be positive and finite, got {0}")]
    NonPositiveSafeHeight(f64),

    #[error("strategy is not supported: {0}")]
    UnsupportedStrategy(&'static str),
}

/// Errors in the pass hierarchy handed to the builder.
#[derive(Debug, Error)]
pub enum LayupError {
    #[error("tape not found in store")]
    TapeNotFound,

    #[error("job contains no plies")]
    EmptyJob,

    #[error("ply {0} contains no tape passes")]
    EmptyPly(usize),
}

/// Step of the trajectory build that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Landing,
    Runway,
    Takeoff,
    TapeLink,
    PlyLink,
    Enter,
    Exit,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Landing => "landing",
            Self::Runway => "runway",
            Self::Takeoff => "takeoff",
            Self::TapeLink => "tape link",
            Self::PlyLink => "ply link",
            Self::Enter => "enter",
            Self::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Position in the pass hierarchy where a build step failed.
///
/// For links, the indices name the earlier of the two linked units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildLocation {
    pub ply: Option<usize>,
    pub tape: Option<usize>,
    pub step: BuildStep,
}

impl BuildLocation {
    /// Creates a location for a step outside any ply (enter/exit).
    #[must_use]
    pub fn job(step: BuildStep) -> Self {
        Self {
            ply: None,
            tape: None,
            step,
        }
    }
}

impl fmt::Display for BuildLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ply) = self.ply {
            write!(f, "ply {ply}, ")?;
        }
        if let Some(tape) = self.tape {
            write!(f, "tape {tape}, ")?;
        }
        write!(f, "{}", self.step)
    }
}

/// Convenience type alias for results using [`TapepathError`].
pub type Result<T> = std::result::Result<T, TapepathError>;
