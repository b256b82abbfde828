use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{BuildLocation, BuildStep, LayupError, Result, TapepathError};
use crate::geometry::curve::{Curve, LineSegment};
use crate::geometry::surface::Surface;
use crate::layup::{PlyPass, TapePass, TapeStore};
use crate::math::Point3;
use crate::strategy::{LinkStrategy, TouchDirection, TouchStrategy};

use super::{PlyTrajectory, TapeTrajectory, Trajectory, TrajectoryConfig};

/// Composes the tool path of a job from its pass hierarchy.
///
/// The surface, tape store, and ply passes are borrowed for the builder's
/// lifetime and never modified. Strategies are owned and can be swapped
/// between builds.
///
/// Each level is built in two phases: the tape (or ply) bodies first, which
/// are independent of each other, then the links between neighbours in a
/// sequential pass over the bodies actually built.
#[derive(Debug)]
pub struct TrajectoryBuilder<'a> {
    surface: &'a dyn Surface,
    store: &'a TapeStore,
    plies: &'a [PlyPass],
    landing: Box<dyn TouchStrategy + 'a>,
    takeoff: Box<dyn TouchStrategy + 'a>,
    link: Box<dyn LinkStrategy + 'a>,
    parallel: bool,
}

impl<'a> TrajectoryBuilder<'a> {
    /// Creates a builder with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default strategies cannot be built for
    /// `surface` (for example, its offset is degenerate).
    pub fn new(surface: &'a dyn Surface, store: &'a TapeStore, plies: &'a [PlyPass]) -> Result<Self> {
        Self::with_config(surface, store, plies, &TrajectoryConfig::default())
    }

    /// Creates a builder with the strategies named in `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-positive safe height or an
    /// unsupported strategy, or a geometry error if the link strategy cannot
    /// be built for `surface`.
    pub fn with_config(
        surface: &'a dyn Surface,
        store: &'a TapeStore,
        plies: &'a [PlyPass],
        config: &TrajectoryConfig,
    ) -> Result<Self> {
        let height = config.validate()?;
        Ok(Self {
            surface,
            store,
            plies,
            landing: config.landing.create(surface, height)?,
            takeoff: config.takeoff.create(surface, height)?,
            link: config.link.create(surface, height)?,
            parallel: config.parallel,
        })
    }

    /// Replaces the strategy for approach moves.
    pub fn set_landing_strategy(&mut self, strategy: Box<dyn TouchStrategy + 'a>) {
        self.landing = strategy;
    }

    /// Replaces the strategy for departure moves.
    pub fn set_takeoff_strategy(&mut self, strategy: Box<dyn TouchStrategy + 'a>) {
        self.takeoff = strategy;
    }

    /// Replaces the strategy for links between tapes and plies.
    pub fn set_link_strategy(&mut self, strategy: Box<dyn LinkStrategy + 'a>) {
        self.link = strategy;
    }

    /// Switches between sequential and rayon-parallel body construction.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Returns the layup surface.
    #[must_use]
    pub fn surface(&self) -> &'a dyn Surface {
        self.surface
    }

    /// Returns the ply passes of the job.
    #[must_use]
    pub fn plies(&self) -> &'a [PlyPass] {
        self.plies
    }

    /// Builds landing, runway, and takeoff for one tape pass.
    ///
    /// # Errors
    ///
    /// Returns the first failure, annotated with the failing step.
    pub fn build_tape(&self, pass: &TapePass) -> Result<TapeTrajectory> {
        self.tape_body(pass, None, None)
    }

    /// Builds every tape of `ply` in order and links neighbouring tapes.
    ///
    /// An empty ply yields an empty trajectory.
    ///
    /// # Errors
    ///
    /// Returns the first failure, annotated with the failing tape and step.
    pub fn build_ply(&self, ply: &PlyPass) -> Result<PlyTrajectory> {
        self.ply_body(ply, None)
    }

    /// Builds the full job: every ply, the links between plies, and the moves
    /// from `start` to the first landing and from the last takeoff to `finish`.
    ///
    /// # Errors
    ///
    /// Returns [`LayupError::EmptyJob`] or [`LayupError::EmptyPly`] when the
    /// job has no anchor for a move, otherwise the first geometry failure
    /// annotated with its ply, tape, and step. Nothing is returned on failure.
    pub fn build(&self, start: &Point3, finish: &Point3) -> Result<Trajectory> {
        if self.plies.is_empty() {
            return Err(LayupError::EmptyJob.into());
        }
        if let Some(index) = self.plies.iter().position(PlyPass::is_empty) {
            return Err(LayupError::EmptyPly(index).into());
        }
        debug!(plies = self.plies.len(), parallel = self.parallel, "building trajectory");

        let plies: Vec<PlyTrajectory> = if self.parallel {
            self.plies
                .par_iter()
                .enumerate()
                .map(|(i, ply)| self.ply_body(ply, Some(i)))
                .collect::<Result<_>>()?
        } else {
            self.plies
                .iter()
                .enumerate()
                .map(|(i, ply)| self.ply_body(ply, Some(i)))
                .collect::<Result<_>>()?
        };

        let mut links = Vec::with_capacity(plies.len().saturating_sub(1));
        for (i, pair) in plies.windows(2).enumerate() {
            let location = BuildLocation {
                ply: Some(i),
                tape: None,
                step: BuildStep::PlyLink,
            };
            let from = pair[0].last_tape().ok_or(LayupError::EmptyPly(i))?;
            let to = pair[1].first_tape().ok_or(LayupError::EmptyPly(i + 1))?;
            let link = self
                .link_between(from, to)
                .map_err(|e| e.located(location))?;
            links.push(link);
        }

        let first = plies
            .first()
            .and_then(PlyTrajectory::first_tape)
            .ok_or(LayupError::EmptyJob)?;
        let last = plies
            .last()
            .and_then(PlyTrajectory::last_tape)
            .ok_or(LayupError::EmptyJob)?;

        let enter = first
            .entry_point()
            .map(|entry| LineSegment::new(*start, entry))
            .map_err(|e| e.located(BuildLocation::job(BuildStep::Enter)))?;
        let exit = last
            .exit_point()
            .map(|exit| LineSegment::new(exit, *finish))
            .map_err(|e| e.located(BuildLocation::job(BuildStep::Exit)))?;

        debug!(plies = plies.len(), ply_links = links.len(), "trajectory built");
        Ok(Trajectory {
            enter: Box::new(enter),
            plies,
            links,
            exit: Box::new(exit),
        })
    }

    fn ply_body(&self, ply: &PlyPass, ply_index: Option<usize>) -> Result<PlyTrajectory> {
        let passes = &ply.tape_passes;
        let tapes: Vec<TapeTrajectory> = if self.parallel {
            passes
                .par_iter()
                .enumerate()
                .map(|(i, pass)| self.tape_body(pass, ply_index, Some(i)))
                .collect::<Result<_>>()?
        } else {
            passes
                .iter()
                .enumerate()
                .map(|(i, pass)| self.tape_body(pass, ply_index, Some(i)))
                .collect::<Result<_>>()?
        };

        let mut links = Vec::with_capacity(tapes.len().saturating_sub(1));
        for (i, pair) in tapes.windows(2).enumerate() {
            let location = BuildLocation {
                ply: ply_index,
                tape: Some(i),
                step: BuildStep::TapeLink,
            };
            let link = self
                .link_between(&pair[0], &pair[1])
                .map_err(|e| e.located(location))?;
            links.push(link);
        }

        trace!(ply = ?ply_index, tapes = tapes.len(), links = links.len(), "ply built");
        Ok(PlyTrajectory { tapes, links })
    }

    fn tape_body(
        &self,
        pass: &TapePass,
        ply: Option<usize>,
        tape: Option<usize>,
    ) -> Result<TapeTrajectory> {
        let at = |step| move |e: TapepathError| e.located(BuildLocation { ply, tape, step });

        let runway = self.runway(pass).map_err(at(BuildStep::Runway))?;
        let landing = runway
            .start_point()
            .and_then(|p| self.landing.create_trajectory(&p, TouchDirection::Approach))
            .map_err(at(BuildStep::Landing))?;
        let takeoff = runway
            .end_point()
            .and_then(|p| self.takeoff.create_trajectory(&p, TouchDirection::Depart))
            .map_err(at(BuildStep::Takeoff))?;

        Ok(TapeTrajectory {
            landing,
            runway,
            takeoff,
        })
    }

    /// Owned copy of the pass's traversal curve over its full extent.
    fn runway(&self, pass: &TapePass) -> Result<Box<dyn Curve>> {
        let path = pass.path(self.store)?;
        let domain = path.domain();
        path.trimmed(domain.t_min, domain.t_max)
    }

    fn link_between(&self, from: &TapeTrajectory, to: &TapeTrajectory) -> Result<Box<dyn Curve>> {
        let source = from.exit_point()?;
        let target = to.entry_point()?;
        self.link.create_trajectory(&source, &target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, TapepathError};
    use crate::geometry::curve::{CurveKind, Ellipse};
    use crate::geometry::surface::{Cylinder, Plane, SurfaceDomain};
    use crate::layup::{LayDirection, Tape, TapeId};
    use crate::math::Vector3;
    use crate::strategy::{NormalTouch, StraightLink};
    use std::f64::consts::{PI, TAU};

    #[derive(Debug)]
    struct BlockedLink;

    impl LinkStrategy for BlockedLink {
        fn create_trajectory(&self, _: &Point3, _: &Point3) -> Result<Box<dyn Curve>> {
            Err(GeometryError::Intersection("blocked".into()).into())
        }
    }

    fn plate() -> Plane {
        Plane::new(Point3::origin(), Vector3::x(), Vector3::y())
            .unwrap()
            .bounded(SurfaceDomain::new(0.0, 500.0, 0.0, 500.0))
    }

    fn strip(store: &mut TapeStore, y: f64) -> TapeId {
        store.add_tape(Tape::new(Box::new(LineSegment::new(
            Point3::new(10.0, y, 0.0),
            Point3::new(400.0, y, 0.0),
        ))))
    }

    fn forward(id: TapeId) -> TapePass {
        TapePass::new(id, LayDirection::Forward)
    }

    #[test]
    fn tape_moves_are_continuous() {
        let surface = plate();
        let mut store = TapeStore::new();
        let id = strip(&mut store, 50.0);
        let builder = TrajectoryBuilder::new(&surface, &store, &[]).unwrap();

        let tape = builder
            .build_tape(&TapePass::new(id, LayDirection::Backward))
            .unwrap();
        assert_eq!(tape.runway.start_point().unwrap(), Point3::new(400.0, 50.0, 0.0));
        assert_eq!(tape.landing.end_point().unwrap(), tape.runway.start_point().unwrap());
        assert_eq!(tape.runway.end_point().unwrap(), tape.takeoff.start_point().unwrap());
        assert!((tape.entry_point().unwrap().z - 200.0).abs() < 1e-9);
    }

    #[test]
    fn hoop_runway_keeps_full_loop() {
        let mandrel = Cylinder::new(Point3::origin(), 100.0, Vector3::x(), Vector3::z())
            .unwrap()
            .bounded(SurfaceDomain::new(0.0, TAU, 0.0, 1000.0));
        let hoop =
            Ellipse::full(Point3::new(500.0, 0.0, 0.0), 100.0, 100.0, Vector3::x(), Vector3::z())
                .unwrap();
        let path_length = hoop.length().unwrap();
        let mut store = TapeStore::new();
        let id = store.add_tape(Tape::new(Box::new(hoop)));
        let builder = TrajectoryBuilder::new(&mandrel, &store, &[]).unwrap();

        for direction in [LayDirection::Forward, LayDirection::Backward] {
            let tape = builder.build_tape(&TapePass::new(id, direction)).unwrap();
            assert!((tape.runway.length().unwrap() - path_length).abs() < 1e-9);
            assert!((path_length - 200.0 * PI).abs() < 1e-6);
            assert_eq!(tape.landing.end_point().unwrap(), tape.runway.start_point().unwrap());
            assert_eq!(tape.runway.end_point().unwrap(), tape.takeoff.start_point().unwrap());
        }
    }

    #[test]
    fn swapped_link_strategy_is_used() {
        let surface = plate();
        let mut store = TapeStore::new();
        let ply = PlyPass::new(vec![forward(strip(&mut store, 50.0)), forward(strip(&mut store, 80.0))]);
        let mut builder = TrajectoryBuilder::new(&surface, &store, &[]).unwrap();
        builder.set_link_strategy(Box::new(StraightLink));
        builder.set_landing_strategy(Box::new(NormalTouch::new(&surface, 10.0).unwrap()));
        builder.set_takeoff_strategy(Box::new(NormalTouch::new(&surface, 30.0).unwrap()));

        let trajectory = builder.build_ply(&ply).unwrap();
        assert_eq!(trajectory.links.len(), 1);
        assert_eq!(trajectory.links[0].kind(), CurveKind::LineSegment);
        let link = &trajectory.links[0];
        assert!((link.start_point().unwrap().z - 30.0).abs() < 1e-9);
        assert!((link.end_point().unwrap().z - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_ply_builds_empty_trajectory() {
        let surface = plate();
        let store = TapeStore::new();
        let builder = TrajectoryBuilder::new(&surface, &store, &[]).unwrap();
        let trajectory = builder.build_ply(&PlyPass::default()).unwrap();
        assert!(trajectory.tapes.is_empty());
        assert!(trajectory.links.is_empty());
    }

    #[test]
    fn empty_job_is_rejected() {
        let surface = plate();
        let store = TapeStore::new();
        let builder = TrajectoryBuilder::new(&surface, &store, &[]).unwrap();
        assert!(matches!(
            builder.build(&Point3::origin(), &Point3::origin()),
            Err(TapepathError::Layup(LayupError::EmptyJob))
        ));
    }

    #[test]
    fn empty_ply_in_job_is_rejected() {
        let surface = plate();
        let mut store = TapeStore::new();
        let plies = vec![PlyPass::new(vec![forward(strip(&mut store, 50.0))]), PlyPass::default()];
        let builder = TrajectoryBuilder::new(&surface, &store, &plies).unwrap();
        assert!(matches!(
            builder.build(&Point3::origin(), &Point3::origin()),
            Err(TapepathError::Layup(LayupError::EmptyPly(1)))
        ));
    }

    #[test]
    fn landing_failure_names_ply_and_tape() {
        let surface = plate();
        let mut store = TapeStore::new();
        let on_plate = strip(&mut store, 50.0);
        let off_plate = strip(&mut store, 900.0);
        let plies = vec![
            PlyPass::new(vec![forward(on_plate)]),
            PlyPass::new(vec![forward(on_plate), forward(off_plate)]),
        ];
        let builder = TrajectoryBuilder::new(&surface, &store, &plies).unwrap();

        let err = builder.build(&Point3::origin(), &Point3::origin()).unwrap_err();
        assert_eq!(
            err.location(),
            Some(&BuildLocation {
                ply: Some(1),
                tape: Some(1),
                step: BuildStep::Landing,
            })
        );
        assert!(matches!(
            err.root_cause(),
            TapepathError::Geometry(GeometryError::Projection(_))
        ));
    }

    #[test]
    fn link_failure_names_ply_link() {
        let surface = plate();
        let mut store = TapeStore::new();
        let id = strip(&mut store, 50.0);
        let plies = vec![PlyPass::new(vec![forward(id)]), PlyPass::new(vec![forward(id)])];
        let mut builder = TrajectoryBuilder::new(&surface, &store, &plies).unwrap();
        builder.set_link_strategy(Box::new(BlockedLink));

        let err = builder.build(&Point3::origin(), &Point3::origin()).unwrap_err();
        assert_eq!(err.location().map(|l| (l.ply, l.step)), Some((Some(0), BuildStep::PlyLink)));
    }

    #[test]
    fn missing_tape_fails_on_runway() {
        let surface = plate();
        let mut store = TapeStore::new();
        let id = strip(&mut store, 50.0);
        store.remove_tape(id);
        let builder = TrajectoryBuilder::new(&surface, &store, &[]).unwrap();

        let err = builder.build_tape(&forward(id)).unwrap_err();
        assert_eq!(err.location().map(|l| l.step), Some(BuildStep::Runway));
        assert!(matches!(
            err.root_cause(),
            TapepathError::Layup(LayupError::TapeNotFound)
        ));
    }
}
