//! Tool path generation for automated fiber and tape placement.
//!
//! Given tapes grouped into plies, [`TrajectoryBuilder`] produces the full
//! path of the placement head: approach, working stroke, and departure for
//! every tape, links between tapes and plies routed clear of the layup
//! surface, and the moves to and from the machine's home positions.

pub mod error;
pub mod geometry;
pub mod layup;
pub mod math;
pub mod strategy;
pub mod trajectory;

pub use error::{Result, TapepathError};
pub use trajectory::{Trajectory, TrajectoryBuilder, TrajectoryConfig};
