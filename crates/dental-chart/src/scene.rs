//! The assembled arch: per-tooth instances, interaction state and the draw list.

use std::sync::Arc;

use arch_kernel::{Euler, Point3d, Transform, TriangleMesh, Vec3};
use chart_types::{Arch, Chart, ChartSummary, ClinicalState, ToothArchetype, ToothNumber, ToothSurface};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::appearance::{resolve, MarkerShape, MaterialAttributes, VisualAttributes};
use crate::config::{MeshDetail, SceneConfig};
use crate::error::SceneError;
use crate::geometry_cache::{GeometryCache, ToothGeometry};
use crate::gum::build_gum_band;
use crate::layout::{ArchLayout, ArchPosition};
use crate::profile::tooth_spec;
use crate::visual_state::VisualState;

/// What a draw entry depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DrawKind {
    ToothBody,
    Cusp { index: usize },
    Marker { surface: ToothSurface },
    Gum { arch: Arch },
}

/// Stable identity of a shared mesh, for hosts that upload each mesh once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GeometryKey {
    Body { archetype: ToothArchetype },
    Cusp { archetype: ToothArchetype, index: usize },
    Marker { shape: MarkerShape },
    Gum { arch: Arch },
}

/// A shared, immutable mesh plus its cache key.
#[derive(Debug, Clone)]
pub struct GeometryHandle {
    pub key: GeometryKey,
    pub mesh: Arc<TriangleMesh>,
}

impl GeometryHandle {
    pub fn same_mesh(&self, other: &GeometryHandle) -> bool {
        Arc::ptr_eq(&self.mesh, &other.mesh)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawTransform {
    pub position: Point3d,
    pub rotation: Euler,
    pub scale: Vec3,
}

impl DrawTransform {
    pub fn identity() -> Self {
        Self {
            position: Point3d::ORIGIN,
            rotation: Euler::default(),
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Transform {
        Transform::from_trs(self.position, self.rotation, self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct DrawEntry {
    pub kind: DrawKind,
    /// `None` for the gum bands.
    pub tooth: Option<ToothNumber>,
    pub geometry: GeometryHandle,
    pub transform: DrawTransform,
    pub material: MaterialAttributes,
    pub badge: Option<u32>,
}

/// Host pointer events, keyed by tooth number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "tooth", rename_all = "kebab-case")]
pub enum PointerEvent {
    Enter(ToothNumber),
    Leave(ToothNumber),
    Click(ToothNumber),
}

/// Invoked whenever the selection changes: the newly selected tooth and its
/// clinical state, or `None` once nothing is selected.
pub type SelectionCallback = Box<dyn FnMut(Option<(ToothNumber, &ClinicalState)>) + Send>;

#[derive(Debug, Clone)]
struct ToothInstance {
    number: ToothNumber,
    state: ClinicalState,
    placement: ArchPosition,
    attributes: VisualAttributes,
    visual: VisualState,
    geometry: Arc<ToothGeometry>,
    marker_mesh: Option<Arc<TriangleMesh>>,
}

/// Counts describing the current scene, for logging and host status lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneStats {
    pub draw_entries: usize,
    pub markers: usize,
    pub selected: Option<ToothNumber>,
    pub hovered: Option<ToothNumber>,
    pub animating: bool,
}

pub struct ArchScene {
    config: SceneConfig,
    layout: ArchLayout,
    cache: GeometryCache,
    gums: Vec<(Arch, Arc<TriangleMesh>)>,
    chart: Chart,
    teeth: Vec<ToothInstance>,
    selected: Option<ToothNumber>,
    hovered: Option<ToothNumber>,
    on_select: Option<SelectionCallback>,
}

impl std::fmt::Debug for ArchScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchScene")
            .field("config", &self.config)
            .field("teeth", &self.teeth.len())
            .field("selected", &self.selected)
            .field("hovered", &self.hovered)
            .finish_non_exhaustive()
    }
}

/// Settling threshold for `SceneStats::animating`.
const SETTLED_EPSILON: f64 = 1e-4;

impl ArchScene {
    /// An arch with every tooth healthy.
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let mut scene = Self {
            layout: ArchLayout::from_config(&config),
            cache: GeometryCache::new(config.mesh),
            config,
            gums: Vec::new(),
            chart: Chart::new(),
            teeth: Vec::new(),
            selected: None,
            hovered: None,
            on_select: None,
        };
        scene.rebuild_gums()?;
        scene.load_chart(Chart::new(), None)?;
        Ok(scene)
    }

    fn rebuild_gums(&mut self) -> Result<(), SceneError> {
        let mut gums = Vec::with_capacity(2);
        for arch in [Arch::Upper, Arch::Lower] {
            let band = build_gum_band(&self.layout.arch_positions(arch), arch, &self.config.gum)?;
            gums.push((arch, Arc::new(band)));
        }
        self.gums = gums;
        Ok(())
    }

    fn instance(&self, number: ToothNumber, state: ClinicalState) -> Result<ToothInstance, SceneError> {
        let attributes = resolve(&state, number);
        let marker_mesh = attributes
            .marker_style
            .map(|style| self.cache.marker(style.shape))
            .transpose()?;
        Ok(ToothInstance {
            number,
            placement: self.layout.position(number),
            visual: VisualState::new(tooth_spec(number.archetype()).squash),
            geometry: self.cache.geometry(number.archetype())?,
            attributes,
            marker_mesh,
            state,
        })
    }

    /// Replace the chart. Visual state is reset and hover cleared; `selected`
    /// becomes the new selection.
    #[instrument(skip(self, chart), fields(entries = chart.len()))]
    pub fn load_chart(&mut self, chart: Chart, selected: Option<ToothNumber>) -> Result<(), SceneError> {
        let teeth = ToothNumber::all()
            .map(|n| self.instance(n, chart.state(n)))
            .collect::<Result<Vec<_>, _>>()?;
        self.teeth = teeth;
        self.chart = chart;
        self.hovered = None;
        let previous = self.selected.take();
        match selected {
            Some(tooth) => self.select(tooth),
            None if previous.is_some() => self.notify_selection(),
            None => {}
        }
        info!(markers = self.marker_count(), "chart loaded into scene");
        Ok(())
    }

    fn tooth_mut(&mut self, tooth: ToothNumber) -> &mut ToothInstance {
        &mut self.teeth[(tooth.get() - 1) as usize]
    }

    fn tooth(&self, tooth: ToothNumber) -> &ToothInstance {
        &self.teeth[(tooth.get() - 1) as usize]
    }

    fn select(&mut self, tooth: ToothNumber) {
        if let Some(previous) = self.selected.replace(tooth) {
            self.tooth_mut(previous).visual.selected = false;
        }
        self.tooth_mut(tooth).visual.selected = true;
        debug!(%tooth, "tooth selected");
        self.notify_selection();
    }

    fn notify_selection(&mut self) {
        if let Some(callback) = self.on_select.as_mut() {
            let current = self
                .selected
                .map(|t| (t, &self.teeth[(t.get() - 1) as usize].state));
            callback(current);
        }
    }

    pub fn clear_selection(&mut self) {
        if let Some(previous) = self.selected.take() {
            self.tooth_mut(previous).visual.selected = false;
            debug!(tooth = %previous, "selection cleared");
            self.notify_selection();
        }
    }

    /// Toggle selection of `tooth`; any other selected tooth is deselected.
    /// Returns the selection afterwards.
    pub fn click(&mut self, tooth: ToothNumber) -> Option<ToothNumber> {
        if self.selected == Some(tooth) {
            self.clear_selection();
        } else {
            self.select(tooth);
        }
        self.selected
    }

    pub fn pointer_enter(&mut self, tooth: ToothNumber) {
        if let Some(previous) = self.hovered.replace(tooth) {
            self.tooth_mut(previous).visual.hovered = false;
        }
        self.tooth_mut(tooth).visual.hovered = true;
    }

    /// Leaving a tooth that is not the hovered one is ignored.
    pub fn pointer_leave(&mut self, tooth: ToothNumber) {
        if self.hovered == Some(tooth) {
            self.hovered = None;
            self.tooth_mut(tooth).visual.hovered = false;
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<ToothNumber> {
        match event {
            PointerEvent::Enter(tooth) => self.pointer_enter(tooth),
            PointerEvent::Leave(tooth) => self.pointer_leave(tooth),
            PointerEvent::Click(tooth) => {
                self.click(tooth);
            }
        }
        self.selected
    }

    /// Advance every tooth's animation by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        let anim = self.config.animation;
        for tooth in &mut self.teeth {
            tooth.visual.advance(dt, &anim);
        }
    }

    /// Jump every tooth to its target scale.
    pub fn settle(&mut self) {
        let anim = self.config.animation;
        for tooth in &mut self.teeth {
            tooth.visual.current_scale = tooth.visual.target_scale(&anim);
        }
    }

    pub fn selected(&self) -> Option<ToothNumber> {
        self.selected
    }

    pub fn hovered(&self) -> Option<ToothNumber> {
        self.hovered
    }

    pub fn on_selection_change(
        &mut self,
        callback: impl FnMut(Option<(ToothNumber, &ClinicalState)>) + Send + 'static,
    ) {
        self.on_select = Some(Box::new(callback));
    }

    pub fn clinical_state(&self, tooth: ToothNumber) -> &ClinicalState {
        &self.tooth(tooth).state
    }

    pub fn visual_state(&self, tooth: ToothNumber) -> &VisualState {
        &self.tooth(tooth).visual
    }

    pub fn placement(&self, tooth: ToothNumber) -> ArchPosition {
        self.tooth(tooth).placement
    }

    pub fn attributes(&self, tooth: ToothNumber) -> &VisualAttributes {
        &self.tooth(tooth).attributes
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn summary(&self) -> ChartSummary {
        self.chart.summary()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Re-tessellate teeth and markers at a new density, keeping chart,
    /// selection, hover and animation state. On error nothing changes.
    pub fn set_mesh_detail(&mut self, detail: MeshDetail) -> Result<(), SceneError> {
        if detail == self.cache.detail() {
            return Ok(());
        }
        let cache = GeometryCache::new(detail);
        cache.warm()?;
        let rebuilt = self
            .teeth
            .iter()
            .map(|tooth| {
                let geometry = cache.geometry(tooth.number.archetype())?;
                let marker_mesh = tooth
                    .attributes
                    .marker_style
                    .map(|style| cache.marker(style.shape))
                    .transpose()?;
                Ok((geometry, marker_mesh))
            })
            .collect::<Result<Vec<_>, SceneError>>()?;
        for (tooth, (geometry, marker_mesh)) in self.teeth.iter_mut().zip(rebuilt) {
            tooth.geometry = geometry;
            tooth.marker_mesh = marker_mesh;
        }
        info!(?detail, "mesh detail changed");
        self.cache = cache;
        self.config.mesh = detail;
        Ok(())
    }

    fn marker_count(&self) -> usize {
        self.teeth
            .iter()
            .filter(|t| t.marker_mesh.is_some())
            .map(|t| t.attributes.affected_offsets.len())
            .sum()
    }

    pub fn stats(&self) -> SceneStats {
        let anim = self.config.animation;
        let markers = self.marker_count();
        let cusps: usize = self.teeth.iter().map(|t| t.geometry.cusps.len()).sum();
        SceneStats {
            draw_entries: self.teeth.len() + cusps + markers + self.gums.len(),
            markers,
            selected: self.selected,
            hovered: self.hovered,
            animating: self
                .teeth
                .iter()
                .any(|t| !t.visual.is_settled(&anim, SETTLED_EPSILON)),
        }
    }

    fn body_material(&self, tooth: &ToothInstance) -> MaterialAttributes {
        let anim = &self.config.animation;
        let mut material = tooth.attributes.material;
        let glow = if tooth.visual.selected {
            anim.selected_glow
        } else if tooth.visual.hovered {
            anim.hover_glow
        } else {
            0.0
        };
        if glow > 0.0 {
            material.emissive = material.color;
            material.emissive_intensity = glow;
        }
        material
    }

    /// Draw entries for this frame: per tooth 1..=32 the body, its cusps and
    /// its markers, followed by the upper and lower gum bands.
    pub fn draw_list(&self) -> Vec<DrawEntry> {
        let anim = &self.config.animation;
        let mut entries = Vec::with_capacity(self.stats().draw_entries);

        for tooth in &self.teeth {
            let archetype = tooth.number.archetype();
            let material = self.body_material(tooth);
            let body_transform = DrawTransform {
                position: tooth.placement.position,
                rotation: tooth.placement.rotation,
                scale: tooth.visual.current_scale,
            };
            let badge = tooth.attributes.badge;

            entries.push(DrawEntry {
                kind: DrawKind::ToothBody,
                tooth: Some(tooth.number),
                geometry: GeometryHandle {
                    key: GeometryKey::Body { archetype },
                    mesh: Arc::clone(&tooth.geometry.body),
                },
                transform: body_transform,
                material,
                badge,
            });

            for (index, cusp) in tooth.geometry.cusps.iter().enumerate() {
                entries.push(DrawEntry {
                    kind: DrawKind::Cusp { index },
                    tooth: Some(tooth.number),
                    geometry: GeometryHandle {
                        key: GeometryKey::Cusp { archetype, index },
                        mesh: Arc::clone(cusp),
                    },
                    transform: body_transform,
                    material,
                    badge: None,
                });
            }

            if let (Some(style), Some(mesh)) = (&tooth.attributes.marker_style, &tooth.marker_mesh) {
                let pulse = if style.pulses { tooth.visual.pulse(anim) } else { 1.0 };
                let size = tooth.attributes.marker_scale * pulse;
                let grow = tooth.visual.scale_factor();
                for (surface, offset) in &tooth.attributes.affected_offsets {
                    entries.push(DrawEntry {
                        kind: DrawKind::Marker { surface: *surface },
                        tooth: Some(tooth.number),
                        geometry: GeometryHandle {
                            key: GeometryKey::Marker { shape: style.shape },
                            mesh: Arc::clone(mesh),
                        },
                        transform: DrawTransform {
                            position: tooth.placement.world_point(*offset * grow),
                            rotation: tooth.placement.rotation,
                            scale: Vec3::splat(size),
                        },
                        material: MaterialAttributes::marker(style),
                        badge: None,
                    });
                }
            }
        }

        for (arch, mesh) in &self.gums {
            entries.push(DrawEntry {
                kind: DrawKind::Gum { arch: *arch },
                tooth: None,
                geometry: GeometryHandle {
                    key: GeometryKey::Gum { arch: *arch },
                    mesh: Arc::clone(mesh),
                },
                transform: DrawTransform::identity(),
                material: MaterialAttributes::gum(),
                badge: None,
            });
        }
        entries
    }
}

/// One-shot draw list for a chart, with every tooth at its resting scale.
pub fn build_scene(
    chart: Chart,
    selected: Option<ToothNumber>,
    config: SceneConfig,
) -> Result<Vec<DrawEntry>, SceneError> {
    let mut scene = ArchScene::new(config)?;
    scene.load_chart(chart, selected)?;
    scene.settle();
    Ok(scene.draw_list())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_types::{Condition, Severity};
    use std::sync::Mutex;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    fn scene() -> ArchScene {
        ArchScene::new(SceneConfig::low_detail()).unwrap()
    }

    #[test]
    fn test_healthy_scene_entry_count() {
        let scene = scene();
        let list = scene.draw_list();
        let cusps: usize = ToothNumber::all()
            .map(|t| tooth_spec(t.archetype()).cusps.len())
            .sum();
        assert_eq!(list.len(), 32 + cusps + 2);
        assert_eq!(scene.stats().draw_entries, list.len());
    }

    #[test]
    fn test_click_toggles_and_replaces() {
        let mut scene = scene();
        assert_eq!(scene.click(tooth(14)), Some(tooth(14)));
        assert_eq!(scene.click(tooth(9)), Some(tooth(9)));
        assert!(!scene.visual_state(tooth(14)).selected);
        assert_eq!(scene.click(tooth(9)), None);
        assert!(!scene.visual_state(tooth(9)).selected);
    }

    #[test]
    fn test_hover_moves_between_teeth() {
        let mut scene = scene();
        scene.pointer_enter(tooth(3));
        scene.pointer_enter(tooth(4));
        assert_eq!(scene.hovered(), Some(tooth(4)));
        assert!(!scene.visual_state(tooth(3)).hovered);
        scene.pointer_leave(tooth(3));
        assert_eq!(scene.hovered(), Some(tooth(4)));
        scene.pointer_leave(tooth(4));
        assert_eq!(scene.hovered(), None);
    }

    #[test]
    fn test_callback_receives_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut scene = scene();
        let mut chart = Chart::new();
        chart.set(tooth(5), ClinicalState::new(Condition::Filled, Severity::Mild));
        scene.load_chart(chart, None).unwrap();
        scene.on_selection_change(move |current| {
            sink.lock().unwrap().push(current.map(|(t, state)| (t, state.condition)))
        });
        scene.click(tooth(5));
        scene.click(tooth(5));
        scene.click(tooth(6));
        scene.clear_selection();
        scene.clear_selection();
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Some((tooth(5), Condition::Filled)),
                None,
                Some((tooth(6), Condition::Healthy)),
                None,
            ]
        );
    }

    #[test]
    fn test_selected_body_glows() {
        let mut scene = scene();
        scene.click(tooth(20));
        let list = scene.draw_list();
        let body = list
            .iter()
            .find(|e| e.tooth == Some(tooth(20)) && e.kind == DrawKind::ToothBody)
            .unwrap();
        assert!(body.material.emissive_intensity > 0.0);
    }

    #[test]
    fn test_set_mesh_detail_keeps_selection() {
        let mut scene = scene();
        scene.click(tooth(30));
        let before = scene.draw_list()[0].geometry.mesh.vertex_count();
        scene.set_mesh_detail(MeshDetail::high()).unwrap();
        assert_eq!(scene.selected(), Some(tooth(30)));
        assert!(scene.draw_list()[0].geometry.mesh.vertex_count() > before);
        assert_eq!(scene.cache().detail(), MeshDetail::high());
    }

    #[test]
    fn test_rejected_detail_leaves_scene_unchanged() {
        let mut scene = scene();
        let before = scene.draw_list()[0].geometry.clone();
        let bad = MeshDetail {
            sphere_height_segments: 1,
            ..MeshDetail::low()
        };
        assert!(scene.set_mesh_detail(bad).is_err());
        assert_eq!(scene.config().mesh, MeshDetail::low());
        assert!(scene.draw_list()[0].geometry.same_mesh(&before));
    }

    #[test]
    fn test_pulsing_marker_changes_size() {
        let mut scene = scene();
        let mut chart = Chart::new();
        chart.set(tooth(12), ClinicalState::new(Condition::Urgent, Severity::Severe));
        scene.load_chart(chart, None).unwrap();
        let size = |scene: &ArchScene| {
            scene
                .draw_list()
                .iter()
                .find(|e| matches!(e.kind, DrawKind::Marker { .. }))
                .map(|e| e.transform.scale.x)
                .unwrap()
        };
        let at_rest = size(&scene);
        scene.advance(0.25);
        assert!((size(&scene) - at_rest).abs() > 1e-3);
    }
}
