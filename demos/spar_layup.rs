//! Spar layup: builds a two-ply tool path on a cylindrical mandrel and prints
//! a summary of every segment.
//!
//! Usage:
//! ```text
//! cargo run --example spar_layup                      # sequential build
//! cargo run --example spar_layup -- --parallel        # rayon build
//! RUST_LOG=tapepath=trace cargo run --example spar_layup
//! ```

use std::f64::consts::TAU;

use tapepath::geometry::{Curve, Cylinder, Polyline, Surface, SurfaceDomain};
use tapepath::layup::{LayDirection, PlyPass, Tape, TapeId, TapePass, TapeStore};
use tapepath::math::{Point3, Vector3};
use tapepath::{Result, TrajectoryBuilder, TrajectoryConfig};

const RADIUS: f64 = 150.0;
const SPAN: f64 = 2400.0;
const TAPES_PER_PLY: u32 = 6;

/// Axial tape at mandrel angle `u`, slightly twisted along its length.
fn axial_tape(store: &mut TapeStore, mandrel: &Cylinder, u: f64) -> Result<TapeId> {
    let points = (0..=8_u32)
        .map(|i| {
            let v = 100.0 + (SPAN - 200.0) * f64::from(i) / 8.0;
            mandrel.evaluate(u + 0.02 * f64::from(i), v)
        })
        .collect::<Result<Vec<Point3>>>()?;
    Ok(store.add_tape(Tape::new(Box::new(Polyline::new(points)?))))
}

fn ply(ids: &[TapeId]) -> PlyPass {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| {
            let direction = if i % 2 == 0 {
                LayDirection::Forward
            } else {
                LayDirection::Backward
            };
            TapePass::new(id, direction)
        })
        .collect()
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("tapepath=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let parallel = std::env::args().any(|a| a == "--parallel");

    let mandrel = Cylinder::new(Point3::origin(), RADIUS, Vector3::x(), Vector3::z())?
        .bounded(SurfaceDomain::new(0.0, TAU, 0.0, SPAN));

    let mut store = TapeStore::new();
    let ids = (0..TAPES_PER_PLY)
        .map(|i| axial_tape(&mut store, &mandrel, 0.12 * f64::from(i)))
        .collect::<Result<Vec<_>>>()?;
    let plies = vec![ply(&ids), ply(&ids[1..])];

    let config = TrajectoryConfig::default()
        .with_safe_height(40.0)
        .with_parallel(parallel);
    let builder = TrajectoryBuilder::with_config(&mandrel, &store, &plies, &config)?;

    let home = Point3::new(-300.0, 0.0, 600.0);
    let trajectory = builder.build(&home, &home)?;

    for segment in trajectory.path() {
        println!(
            "{:<9} ply {:>4} tape {:>4}  {:?}  {:>9.2} mm",
            format!("{:?}", segment.kind),
            segment.ply.map_or_else(|| "-".to_owned(), |p| p.to_string()),
            segment.tape.map_or_else(|| "-".to_owned(), |t| t.to_string()),
            segment.curve.kind(),
            segment.curve.length()?,
        );
    }
    println!(
        "{} tapes, {:.1} mm total, {:.1} mm laid",
        trajectory.tape_count(),
        trajectory.length()?,
        trajectory.working_length()?,
    );
    Ok(())
}
