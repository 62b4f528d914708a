//! Lazily built, shared tooth and marker meshes.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use arch_kernel::operations::primitives::{hemisphere, torus, uv_sphere};
use arch_kernel::operations::revolve::revolve_profile;
use arch_kernel::{OperationError, Point3d, TriangleMesh};
use chart_types::ToothArchetype;
use tracing::debug;

use crate::appearance::MarkerShape;
use crate::config::MeshDetail;
use crate::error::SceneError;
use crate::profile::{build_profile, tooth_spec};

/// Radius of the unit sphere marker before `marker_scale`.
pub const MARKER_SPHERE_RADIUS: f64 = 0.6;
pub const MARKER_CAP_RADIUS: f64 = 0.7;
pub const MARKER_RING_RADIUS: f64 = 0.7;
pub const MARKER_RING_TUBE: f64 = 0.15;

/// Meshes for one archetype, in the tooth's unsquashed local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothGeometry {
    pub archetype: ToothArchetype,
    pub body: Arc<TriangleMesh>,
    /// One sphere per cusp, already placed at the cusp offset.
    pub cusps: Vec<Arc<TriangleMesh>>,
}

impl ToothGeometry {
    pub fn build(archetype: ToothArchetype, detail: &MeshDetail) -> Result<Self, OperationError> {
        let spec = tooth_spec(archetype);
        let body = revolve_profile(&build_profile(spec), detail.lathe_segments, true)?;
        let cusps = spec
            .cusps
            .iter()
            .map(|cusp| {
                uv_sphere(
                    cusp.offset,
                    spec.cusp_radius(cusp),
                    detail.sphere_width_segments,
                    detail.sphere_height_segments,
                )
                .map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            archetype,
            body: Arc::new(body),
            cusps,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.body.vertex_count() + self.cusps.iter().map(|c| c.vertex_count()).sum::<usize>()
    }
}

/// Unit-size marker mesh centered on its anchor.
pub fn build_marker(shape: MarkerShape, detail: &MeshDetail) -> Result<TriangleMesh, OperationError> {
    let (w, h) = (detail.sphere_width_segments, detail.sphere_height_segments);
    match shape {
        MarkerShape::Sphere => uv_sphere(Point3d::ORIGIN, MARKER_SPHERE_RADIUS, w, h),
        MarkerShape::Cap => hemisphere(Point3d::ORIGIN, MARKER_CAP_RADIUS, w, (h / 2).max(1)),
        MarkerShape::Ring => torus(
            Point3d::ORIGIN,
            MARKER_RING_RADIUS,
            MARKER_RING_TUBE,
            h.max(3),
            detail.ring_segments,
        ),
    }
}

fn get_or_build<K, V>(
    map: &RwLock<HashMap<K, Arc<V>>>,
    key: K,
    build: impl FnOnce() -> Result<V, OperationError>,
) -> Result<Arc<V>, SceneError>
where
    K: Eq + Hash + Copy + std::fmt::Debug,
{
    if let Some(hit) = map.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return Ok(Arc::clone(hit));
    }
    // Built outside the lock; a racing builder's result is discarded.
    let built = Arc::new(build()?);
    let mut entries = map.write().unwrap_or_else(PoisonError::into_inner);
    let entry = entries.entry(key).or_insert_with(|| {
        debug!(?key, "cached new mesh");
        built
    });
    Ok(Arc::clone(entry))
}

/// Archetype- and shape-keyed mesh cache. Entries are never mutated after
/// insertion, so handles can be compared with `Arc::ptr_eq`.
#[derive(Debug, Default)]
pub struct GeometryCache {
    detail: MeshDetail,
    teeth: RwLock<HashMap<ToothArchetype, Arc<ToothGeometry>>>,
    markers: RwLock<HashMap<MarkerShape, Arc<TriangleMesh>>>,
}

impl GeometryCache {
    pub fn new(detail: MeshDetail) -> Self {
        Self {
            detail,
            ..Self::default()
        }
    }

    pub fn detail(&self) -> MeshDetail {
        self.detail
    }

    pub fn geometry(&self, archetype: ToothArchetype) -> Result<Arc<ToothGeometry>, SceneError> {
        let detail = self.detail;
        get_or_build(&self.teeth, archetype, || ToothGeometry::build(archetype, &detail))
    }

    pub fn marker(&self, shape: MarkerShape) -> Result<Arc<TriangleMesh>, SceneError> {
        let detail = self.detail;
        get_or_build(&self.markers, shape, || build_marker(shape, &detail))
    }

    /// Build every archetype and marker up front.
    pub fn warm(&self) -> Result<(), SceneError> {
        for archetype in ToothArchetype::ALL {
            self.geometry(archetype)?;
        }
        for shape in MarkerShape::ALL {
            self.marker(shape)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        let teeth = self.teeth.read().unwrap_or_else(PoisonError::into_inner).len();
        let markers = self.markers.read().unwrap_or_else(PoisonError::into_inner).len();
        teeth + markers
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.teeth.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.markers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
