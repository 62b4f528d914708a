use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Clinical condition of a single tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    #[default]
    Healthy,
    Monitor,
    Cavity,
    Filled,
    Missing,
    Implant,
    RootCanal,
    PostOp,
    Urgent,
}

impl Condition {
    pub const ALL: [Condition; 9] = [
        Condition::Healthy,
        Condition::Monitor,
        Condition::Cavity,
        Condition::Filled,
        Condition::Missing,
        Condition::Implant,
        Condition::RootCanal,
        Condition::PostOp,
        Condition::Urgent,
    ];

    /// Strict parse. Accepts kebab, snake and camel spellings, any case.
    pub fn parse(value: &str) -> Option<Self> {
        match normalize(value).as_str() {
            "healthy" => Some(Condition::Healthy),
            "monitor" => Some(Condition::Monitor),
            "cavity" => Some(Condition::Cavity),
            "filled" => Some(Condition::Filled),
            "missing" => Some(Condition::Missing),
            "implant" => Some(Condition::Implant),
            "rootcanal" => Some(Condition::RootCanal),
            "postop" => Some(Condition::PostOp),
            "urgent" => Some(Condition::Urgent),
            _ => None,
        }
    }

    /// Parse clinical data, falling back to `Healthy` for legacy or unknown values.
    pub fn parse_lenient(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn!(value, "unrecognized condition, treating tooth as healthy");
            Condition::Healthy
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Condition::Healthy => "healthy",
            Condition::Monitor => "monitor",
            Condition::Cavity => "cavity",
            Condition::Filled => "filled",
            Condition::Missing => "missing",
            Condition::Implant => "implant",
            Condition::RootCanal => "root-canal",
            Condition::PostOp => "post-op",
            Condition::Urgent => "urgent",
        }
    }
}

/// How serious a condition is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
    Urgent,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize(value).as_str() {
            "none" | "" => Some(Severity::None),
            "mild" => Some(Severity::Mild),
            "moderate" => Some(Severity::Moderate),
            "severe" => Some(Severity::Severe),
            "urgent" => Some(Severity::Urgent),
            _ => None,
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn!(value, "unrecognized severity, using none");
            Severity::None
        })
    }
}

/// A named face of a tooth that a marker can be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToothSurface {
    Occlusal,
    Buccal,
    Lingual,
    Mesial,
    Distal,
}

impl ToothSurface {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize(value).as_str() {
            "occlusal" => Some(ToothSurface::Occlusal),
            "buccal" => Some(ToothSurface::Buccal),
            "lingual" => Some(ToothSurface::Lingual),
            "mesial" => Some(ToothSurface::Mesial),
            "distal" => Some(ToothSurface::Distal),
            _ => None,
        }
    }
}

/// Lowercase and strip separators so `Root_Canal`, `root-canal` and `rootCanal` compare equal.
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The clinical state of one tooth as consumed by the visualization core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClinicalState {
    pub condition: Condition,
    pub severity: Severity,
    pub affected_surfaces: BTreeSet<ToothSurface>,
    pub treatment_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
}

impl ClinicalState {
    pub fn new(condition: Condition, severity: Severity) -> Self {
        Self {
            condition,
            severity,
            ..Self::default()
        }
    }

    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn with_surfaces(mut self, surfaces: impl IntoIterator<Item = ToothSurface>) -> Self {
        self.affected_surfaces.extend(surfaces);
        self
    }

    pub fn with_treatments(mut self, count: u32) -> Self {
        self.treatment_count = count;
        self
    }
}

/// Parse surface names, dropping ones this core does not know.
pub fn parse_surfaces<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<ToothSurface> {
    names
        .into_iter()
        .filter_map(|name| {
            let parsed = ToothSurface::parse(name);
            if parsed.is_none() {
                warn!(surface = name, "unrecognized tooth surface ignored");
            }
            parsed
        })
        .collect()
}
