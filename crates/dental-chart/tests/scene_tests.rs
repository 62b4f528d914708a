use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use chart_types::*;
use dental_chart::appearance::surface_offset;
use dental_chart::layout::SurfaceAxes;
use dental_chart::profile::tooth_spec;
use dental_chart::*;

// ── Helper functions ─────────────────────────────────────────────────────

fn tooth(n: u8) -> ToothNumber {
    ToothNumber::new(n).unwrap()
}

fn bodies(list: &[DrawEntry]) -> Vec<&DrawEntry> {
    list.iter().filter(|e| e.kind == DrawKind::ToothBody).collect()
}

fn markers(list: &[DrawEntry]) -> Vec<&DrawEntry> {
    list.iter()
        .filter(|e| matches!(e.kind, DrawKind::Marker { .. }))
        .collect()
}

// ── End-to-end ───────────────────────────────────────────────────────────

#[test]
fn single_cavity_chart_draws_one_occlusal_marker() {
    let chart = Chart::from_json(r#"{"8": {"status": "cavity"}}"#).unwrap();
    let list = build_scene(chart, None, SceneConfig::low_detail()).unwrap();

    let markers = markers(&list);
    assert_eq!(markers.len(), 1);
    let marker = markers[0];
    assert_eq!(marker.tooth, Some(tooth(8)));
    assert_eq!(
        marker.kind,
        DrawKind::Marker {
            surface: ToothSurface::Occlusal
        }
    );
    assert_eq!(marker.geometry.key, GeometryKey::Marker { shape: MarkerShape::Sphere });

    let layout = ArchLayout::default();
    let placement = layout.position(tooth(8));
    let spec = tooth_spec(tooth(8).archetype());
    let lift = arch_kernel::Vec3::new(0.0, -0.3, 0.0);
    let expected = placement.world_point(
        surface_offset(ToothSurface::Occlusal, spec, SurfaceAxes::for_tooth(tooth(8))) + lift,
    );
    assert_abs_diff_eq!(marker.transform.position.x, expected.x, epsilon = 1e-9);
    assert_abs_diff_eq!(marker.transform.position.y, expected.y, epsilon = 1e-9);
    assert_abs_diff_eq!(marker.transform.position.z, expected.z, epsilon = 1e-9);

    let bodies = bodies(&list);
    assert_eq!(bodies.len(), 32);
    let healthy = MaterialAttributes::enamel(Condition::Healthy);
    let healthy_bodies = bodies.iter().filter(|b| b.material == healthy).count();
    assert_eq!(healthy_bodies, 31);
    let cavity_body = bodies.iter().find(|b| b.tooth == Some(tooth(8))).unwrap();
    assert_eq!(cavity_body.material, MaterialAttributes::enamel(Condition::Cavity));
}

#[test]
fn draw_list_follows_tooth_order_then_gums() {
    let mut chart = Chart::new();
    chart.set(
        tooth(3),
        ClinicalState::new(Condition::Filled, Severity::Mild)
            .with_surfaces([ToothSurface::Mesial, ToothSurface::Distal]),
    );
    let list = build_scene(chart, None, SceneConfig::low_detail()).unwrap();

    let teeth: Vec<u8> = list.iter().filter_map(|e| e.tooth).map(|t| t.get()).collect();
    assert!(teeth.windows(2).all(|w| w[0] <= w[1]));

    let gums: Vec<&DrawEntry> = list.iter().filter(|e| e.tooth.is_none()).collect();
    assert_eq!(gums.len(), 2);
    assert_eq!(gums[0].kind, DrawKind::Gum { arch: Arch::Upper });
    assert_eq!(gums[1].kind, DrawKind::Gum { arch: Arch::Lower });
    assert!(matches!(list[list.len() - 1].kind, DrawKind::Gum { arch: Arch::Lower }));

    // Each tooth starts with its body, followed by cusps then markers.
    for window in list.windows(2) {
        if let (Some(a), Some(b)) = (window[0].tooth, window[1].tooth) {
            if a != b {
                assert_eq!(window[1].kind, DrawKind::ToothBody);
            }
        }
    }
    let tooth3: Vec<DrawKind> = list
        .iter()
        .filter(|e| e.tooth == Some(tooth(3)))
        .map(|e| e.kind)
        .collect();
    assert_eq!(tooth3[0], DrawKind::ToothBody);
    assert_eq!(
        &tooth3[tooth3.len() - 2..],
        &[
            DrawKind::Marker { surface: ToothSurface::Mesial },
            DrawKind::Marker { surface: ToothSurface::Distal },
        ]
    );
}

#[test]
fn same_archetype_shares_mesh_handles() {
    let list = build_scene(Chart::new(), None, SceneConfig::low_detail()).unwrap();
    let body = |n: u8| {
        list.iter()
            .find(|e| e.tooth == Some(tooth(n)) && e.kind == DrawKind::ToothBody)
            .unwrap()
    };
    assert_eq!(tooth(6).archetype(), tooth(14).archetype());
    assert!(body(6).geometry.same_mesh(&body(14).geometry));
    assert!(!body(6).geometry.same_mesh(&body(1).geometry));
}

#[test]
fn missing_tooth_is_translucent() {
    let chart = Chart::from_json(r#"{"30": {"status": "missing"}}"#).unwrap();
    let list = build_scene(chart, None, SceneConfig::low_detail()).unwrap();
    let body = list
        .iter()
        .find(|e| e.tooth == Some(tooth(30)) && e.kind == DrawKind::ToothBody)
        .unwrap();
    assert_abs_diff_eq!(body.material.opacity, 0.35);
    assert!(body.material.transparent);
    assert!(markers(&list).is_empty());
}

#[test]
fn treatments_become_badges() {
    let chart = Chart::from_json(r#"{"19": {"status": "filled", "treatments": [{}, {}]}}"#).unwrap();
    let list = build_scene(chart, None, SceneConfig::low_detail()).unwrap();
    let badged: Vec<_> = list.iter().filter(|e| e.badge.is_some()).collect();
    assert_eq!(badged.len(), 1);
    assert_eq!(badged[0].tooth, Some(tooth(19)));
    assert_eq!(badged[0].badge, Some(2));
}

// ── Interaction ──────────────────────────────────────────────────────────

#[test]
fn selecting_another_tooth_replaces_selection() {
    let mut scene = ArchScene::new(SceneConfig::low_detail()).unwrap();
    scene.handle_pointer(PointerEvent::Click(tooth(14)));
    scene.handle_pointer(PointerEvent::Click(tooth(9)));
    assert_eq!(scene.selected(), Some(tooth(9)));
    let selected: Vec<ToothNumber> = ToothNumber::all()
        .filter(|&t| scene.visual_state(t).selected)
        .collect();
    assert_eq!(selected, vec![tooth(9)]);
}

#[test]
fn preselected_tooth_fires_callback_on_load() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut scene = ArchScene::new(SceneConfig::low_detail()).unwrap();
    scene.on_selection_change(move |current| {
        sink.lock()
            .unwrap()
            .push(current.map(|(t, state)| (t.get(), state.condition)))
    });

    let chart = Chart::from_json(r#"{"21": {"status": "root-canal"}}"#).unwrap();
    scene.load_chart(chart, Some(tooth(21))).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Some((21, Condition::RootCanal))]);

    // Reloading without a selection reports the deselect exactly once.
    scene.load_chart(Chart::new(), None).unwrap();
    scene.load_chart(Chart::new(), None).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some((21, Condition::RootCanal)), None]
    );
}

#[test]
fn reload_clears_hover_and_animation() {
    let mut scene = ArchScene::new(SceneConfig::low_detail()).unwrap();
    scene.pointer_enter(tooth(11));
    scene.advance(0.5);
    scene.load_chart(Chart::new(), None).unwrap();
    assert_eq!(scene.hovered(), None);
    let state = scene.visual_state(tooth(11));
    assert_eq!(state.current_scale, state.squash());
    assert!(!scene.stats().animating);
}

#[test]
fn selected_tooth_grows_within_fifty_frames() {
    let mut scene = ArchScene::new(SceneConfig::low_detail()).unwrap();
    scene.click(tooth(1));
    for _ in 0..50 {
        scene.advance(1.0 / 60.0);
    }
    let body = scene
        .draw_list()
        .into_iter()
        .find(|e| e.tooth == Some(tooth(1)) && e.kind == DrawKind::ToothBody)
        .unwrap();
    let squash = tooth_spec(tooth(1).archetype()).squash;
    let target = squash * 1.15;
    for (actual, expected) in body.transform.scale.to_array().iter().zip(target.to_array()) {
        assert!(((actual - expected) / expected).abs() < 0.01, "{actual} vs {expected}");
    }
}

#[test]
fn hovered_marker_follows_tooth_growth() {
    let chart = Chart::from_json(r#"{"5": {"status": "monitor"}}"#).unwrap();
    let mut scene = ArchScene::new(SceneConfig::low_detail()).unwrap();
    scene.load_chart(chart, None).unwrap();
    let rest = markers(&scene.draw_list())[0].transform.position;
    let neck = scene.placement(tooth(5)).position;

    scene.pointer_enter(tooth(5));
    scene.advance(3.0);
    let grown = markers(&scene.draw_list())[0].transform.position;
    assert!(grown.distance_to(&neck) > rest.distance_to(&neck));
}

#[test]
fn summary_counts_every_tooth() {
    let chart =
        Chart::from_json(r#"{"1": {"status": "urgent"}, "2": {"status": "urgent"}, "3": {"status": "implant"}}"#)
            .unwrap();
    let mut scene = ArchScene::new(SceneConfig::default()).unwrap();
    scene.load_chart(chart, None).unwrap();
    let summary = scene.summary();
    assert_eq!(summary.count(Condition::Urgent), 2);
    assert_eq!(summary.count(Condition::Implant), 1);
    assert_eq!(summary.count(Condition::Healthy), 29);
}
