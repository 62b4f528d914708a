use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chart_types::{ChartSummary, ClinicalState, ToothNumber};

use crate::appearance::MaterialAttributes;
use crate::config::MeshDetail;
use crate::scene::{DrawEntry, DrawKind, DrawTransform, GeometryKey};

/// Messages from the host (UI thread or embedding application) to the scene.
/// Serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostToScene {
    /// Replace the chart, keyed by tooth number strings as in patient data.
    LoadChart {
        chart: BTreeMap<String, serde_json::Value>,
        #[serde(default)]
        selected: Option<i64>,
    },
    PointerEnter {
        tooth: i64,
    },
    PointerLeave {
        tooth: i64,
    },
    Click {
        tooth: i64,
    },
    ClearSelection,
    /// Advance animation by `dt` seconds.
    Advance {
        dt: f64,
    },
    SetMeshDetail {
        detail: MeshDetail,
    },
}

/// A draw entry with its mesh replaced by the mesh's cache key, so the host
/// can upload each mesh once and reference it per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub kind: DrawKind,
    pub tooth: Option<ToothNumber>,
    pub geometry: GeometryKey,
    pub transform: DrawTransform,
    pub material: MaterialAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
}

impl From<&DrawEntry> for DrawCommand {
    fn from(entry: &DrawEntry) -> Self {
        Self {
            kind: entry.kind,
            tooth: entry.tooth,
            geometry: entry.geometry.key,
            transform: entry.transform,
            material: entry.material,
            badge: entry.badge,
        }
    }
}

pub fn draw_commands(entries: &[DrawEntry]) -> Vec<DrawCommand> {
    entries.iter().map(DrawCommand::from).collect()
}

/// Messages from the scene back to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SceneToHost {
    ChartLoaded {
        summary: ChartSummary,
        draw_list: Vec<DrawCommand>,
    },
    SelectionChanged {
        selected: Option<ToothNumber>,
        /// Clinical state of the newly selected tooth.
        state: Option<ClinicalState>,
    },
    HoverChanged {
        hovered: Option<ToothNumber>,
    },
    FrameAdvanced {
        draw_list: Vec<DrawCommand>,
        animating: bool,
    },
    Error {
        message: String,
    },
}
