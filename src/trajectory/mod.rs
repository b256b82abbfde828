//! Tool path of the placement head, organised like the pass hierarchy.

mod builder;
mod config;

pub use builder::TrajectoryBuilder;
pub use config::TrajectoryConfig;

use crate::error::Result;
use crate::geometry::curve::Curve;
use crate::math::Point3;

/// The three moves that lay one tape.
#[derive(Debug, Clone)]
pub struct TapeTrajectory {
    /// Approach from the standoff point down to the first contact point.
    pub landing: Box<dyn Curve>,
    /// Working stroke along the tape while in contact.
    pub runway: Box<dyn Curve>,
    /// Departure from the last contact point up to the standoff point.
    pub takeoff: Box<dyn Curve>,
}

impl TapeTrajectory {
    /// Returns where the head enters this tape's moves.
    ///
    /// # Errors
    ///
    /// Returns an error if the landing curve is unbounded.
    pub fn entry_point(&self) -> Result<Point3> {
        self.landing.start_point()
    }

    /// Returns where the head leaves this tape's moves.
    ///
    /// # Errors
    ///
    /// Returns an error if the takeoff curve is unbounded.
    pub fn exit_point(&self) -> Result<Point3> {
        self.takeoff.end_point()
    }
}

/// Moves for one ply: tape trajectories and the links between them.
///
/// `links[i]` joins `tapes[i]` to `tapes[i + 1]`.
#[derive(Debug, Clone, Default)]
pub struct PlyTrajectory {
    pub tapes: Vec<TapeTrajectory>,
    pub links: Vec<Box<dyn Curve>>,
}

impl PlyTrajectory {
    #[must_use]
    pub fn first_tape(&self) -> Option<&TapeTrajectory> {
        self.tapes.first()
    }

    #[must_use]
    pub fn last_tape(&self) -> Option<&TapeTrajectory> {
        self.tapes.last()
    }
}

/// Complete tool path of a lay-up job.
///
/// `links[i]` joins the last tape of `plies[i]` to the first tape of
/// `plies[i + 1]`.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// Move from the machine start position to the first landing.
    pub enter: Box<dyn Curve>,
    pub plies: Vec<PlyTrajectory>,
    pub links: Vec<Box<dyn Curve>>,
    /// Move from the last takeoff to the machine finish position.
    pub exit: Box<dyn Curve>,
}

/// Role of a curve in the flattened tool path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Enter,
    Landing,
    Runway,
    Takeoff,
    TapeLink,
    PlyLink,
    Exit,
}

impl SegmentKind {
    /// Returns whether the head is in contact with the surface.
    #[must_use]
    pub fn is_working(self) -> bool {
        self == Self::Runway
    }
}

/// One curve of the flattened tool path with its place in the hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct PathSegment<'a> {
    pub kind: SegmentKind,
    pub ply: Option<usize>,
    pub tape: Option<usize>,
    pub curve: &'a dyn Curve,
}

impl Trajectory {
    /// Returns the total number of tape trajectories.
    #[must_use]
    pub fn tape_count(&self) -> usize {
        self.plies.iter().map(|p| p.tapes.len()).sum()
    }

    /// Flattens the trajectory into the order the head travels it.
    #[must_use]
    pub fn path(&self) -> Vec<PathSegment<'_>> {
        let mut path = Vec::with_capacity(2 + self.tape_count() * 4 + self.links.len());
        path.push(PathSegment {
            kind: SegmentKind::Enter,
            ply: None,
            tape: None,
            curve: self.enter.as_ref(),
        });

        for (p, ply) in self.plies.iter().enumerate() {
            if p > 0 {
                if let Some(link) = self.links.get(p - 1) {
                    path.push(PathSegment {
                        kind: SegmentKind::PlyLink,
                        ply: Some(p - 1),
                        tape: None,
                        curve: link.as_ref(),
                    });
                }
            }
            for (t, tape) in ply.tapes.iter().enumerate() {
                if t > 0 {
                    if let Some(link) = ply.links.get(t - 1) {
                        path.push(PathSegment {
                            kind: SegmentKind::TapeLink,
                            ply: Some(p),
                            tape: Some(t - 1),
                            curve: link.as_ref(),
                        });
                    }
                }
                for (kind, curve) in [
                    (SegmentKind::Landing, &tape.landing),
                    (SegmentKind::Runway, &tape.runway),
                    (SegmentKind::Takeoff, &tape.takeoff),
                ] {
                    path.push(PathSegment {
                        kind,
                        ply: Some(p),
                        tape: Some(t),
                        curve: curve.as_ref(),
                    });
                }
            }
        }

        path.push(PathSegment {
            kind: SegmentKind::Exit,
            ply: None,
            tape: None,
            curve: self.exit.as_ref(),
        });
        path
    }

    /// Returns the total travel length of the head.
    ///
    /// # Errors
    ///
    /// Returns an error if any curve is unbounded.
    pub fn length(&self) -> Result<f64> {
        self.path().iter().map(|s| s.curve.length()).sum()
    }

    /// Returns the length travelled in contact with the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if any runway is unbounded.
    pub fn working_length(&self) -> Result<f64> {
        self.path()
            .iter()
            .filter(|s| s.kind.is_working())
            .map(|s| s.curve.length())
            .sum()
    }
}
