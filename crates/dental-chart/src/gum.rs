//! Gum ridge tubes swept along each arch.

use arch_kernel::geometry::spline::CatmullRom;
use arch_kernel::operations::sweep::sweep_circle;
use arch_kernel::{OperationError, Point3d, TriangleMesh};
use chart_types::Arch;
use tracing::{debug, instrument};

use crate::config::GumConfig;
use crate::layout::ArchPosition;

/// Gum samples for one arch: tooth positions ordered across the arch by x,
/// moved toward the roots and shifted in depth.
pub fn gum_samples(positions: &[ArchPosition], arch: Arch, config: &GumConfig) -> Vec<Point3d> {
    let toward_roots = match arch {
        Arch::Upper => config.vertical_offset,
        Arch::Lower => -config.vertical_offset,
    };
    let mut samples: Vec<Point3d> = positions
        .iter()
        .map(|p| {
            Point3d::new(
                p.position.x,
                p.position.y + toward_roots,
                p.position.z + config.depth_offset,
            )
        })
        .collect();
    samples.sort_by(|a, b| a.x.total_cmp(&b.x));
    samples
}

/// The centripetal spline the outer gum ridge follows.
pub fn gum_curve(
    positions: &[ArchPosition],
    arch: Arch,
    config: &GumConfig,
) -> Result<CatmullRom, OperationError> {
    CatmullRom::centripetal(gum_samples(positions, arch, config))
}

/// Outer ridge plus a thinner inner ridge pulled toward the arch center,
/// merged into one mesh.
#[instrument(skip(positions, config), fields(samples = positions.len()))]
pub fn build_gum_band(
    positions: &[ArchPosition],
    arch: Arch,
    config: &GumConfig,
) -> Result<TriangleMesh, OperationError> {
    let outer_curve = gum_curve(positions, arch, config)?;
    let inner_points: Vec<Point3d> = outer_curve
        .control_points()
        .iter()
        .map(|p| Point3d::new(p.x * config.inner_pull, p.y, p.z * config.inner_pull))
        .collect();
    let inner_curve = CatmullRom::centripetal(inner_points)?;

    let divisions = config.tubular_segments;
    let mut band = sweep_circle(
        &outer_curve.sample(divisions),
        config.radius,
        config.radial_segments,
        true,
    )?;
    let inner = sweep_circle(
        &inner_curve.sample(divisions),
        config.inner_radius,
        config.radial_segments,
        true,
    )?;
    band.merge(&inner);

    debug!(?arch, vertices = band.vertex_count(), "built gum band");
    Ok(band)
}
