use chart_types::*;

const PATIENT_CHART: &str = r#"{
    "3": {
        "status": "filled",
        "detailedStatus": {
            "condition": "cavity",
            "severity": "moderate",
            "affectedSurfaces": ["occlusal", "Buccal", "palatal"]
        },
        "treatments": [{"code": "D2391"}, {"code": "D0220"}]
    },
    "8": {"status": "monitor"},
    "14": {"detailedStatus": {"condition": "root_canal"}},
    "19": {"status": "sealant"},
    "32": {"status": "missing", "treatments": []},
    "33": {"status": "urgent"},
    "UL6": {"status": "urgent"}
}"#;

fn tooth(n: u8) -> ToothNumber {
    ToothNumber::new(n).unwrap()
}

#[test]
fn patient_chart_parses_with_defects_skipped() {
    let chart = Chart::from_json(PATIENT_CHART).unwrap();
    assert_eq!(chart.len(), 5);
    assert!(chart.iter().all(|(t, _)| (1..=32).contains(&t.get())));
}

#[test]
fn detailed_condition_overrides_legacy_status() {
    let chart = Chart::from_json(PATIENT_CHART).unwrap();
    let state = chart.state(tooth(3));
    assert_eq!(state.condition, Condition::Cavity);
    assert_eq!(state.severity, Severity::Moderate);
    assert_eq!(
        state.affected_surfaces.iter().copied().collect::<Vec<_>>(),
        vec![ToothSurface::Occlusal, ToothSurface::Buccal]
    );
    assert_eq!(state.treatment_count, 2);

    assert_eq!(chart.state(tooth(14)).condition, Condition::RootCanal);
}

#[test]
fn unknown_status_falls_back_to_healthy() {
    let chart = Chart::from_json(PATIENT_CHART).unwrap();
    assert!(chart.get(tooth(19)).is_some());
    assert_eq!(chart.state(tooth(19)).condition, Condition::Healthy);
    assert_eq!(chart.state(tooth(20)), ClinicalState::healthy());
}

#[test]
fn summary_covers_whole_mouth() {
    let summary = Chart::from_json(PATIENT_CHART).unwrap().summary();
    let total: u32 = summary.conditions.values().sum();
    assert_eq!(total, 32);
    assert_eq!(summary.count(Condition::Missing), 1);
    assert_eq!(summary.count(Condition::Urgent), 0);
    assert_eq!(summary.treatments, 2);
}

#[test]
fn chart_survives_json_round_trip() {
    let chart = Chart::from_json(PATIENT_CHART).unwrap();
    let json = serde_json::to_string(&chart).unwrap();
    let back: Chart = serde_json::from_str(&json).unwrap();
    assert_eq!(back, chart);
}
