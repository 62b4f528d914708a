use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::clinical::{parse_surfaces, ClinicalState, Condition, Severity};
use crate::error::ChartError;
use crate::tooth::ToothNumber;

/// Any non-string value reads as absent.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// A non-array reads as empty; array items of the wrong type are dropped.
fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_detail<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DetailedStatus>, D::Error> {
    Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

/// A tooth record as stored by the clinical-records service.
///
/// Fields with the wrong JSON type fall back to their defaults rather than
/// failing the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToothRecord {
    /// Legacy single-condition string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_detail")]
    pub detailed_status: Option<DetailedStatus>,
    /// Only the length is used, as a badge count.
    #[serde(default, deserialize_with = "lenient_list")]
    pub treatments: Vec<Value>,
}

/// Structured condition data that supersedes the legacy `status` string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStatus {
    #[serde(default, deserialize_with = "lenient_string")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub affected_surfaces: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub clinical_notes: Option<String>,
}

impl ToothRecord {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Self::default()
        }
    }

    /// Convert into the core's clinical state. Never fails: unknown values
    /// fall back to their defaults.
    pub fn to_clinical_state(&self) -> ClinicalState {
        let detailed = self.detailed_status.as_ref();

        let condition = detailed
            .and_then(|d| d.condition.as_deref())
            .or(self.status.as_deref())
            .map(Condition::parse_lenient)
            .unwrap_or_default();

        let severity = detailed
            .and_then(|d| d.severity.as_deref())
            .map(Severity::parse_lenient)
            .unwrap_or_default();

        let affected_surfaces = detailed
            .map(|d| parse_surfaces(d.affected_surfaces.iter().map(String::as_str)))
            .unwrap_or_default();

        ClinicalState {
            condition,
            severity,
            affected_surfaces,
            treatment_count: self.treatments.len() as u32,
            clinical_notes: detailed.and_then(|d| d.clinical_notes.clone()),
        }
    }
}

/// A patient's chart: clinical state per tooth. Teeth without an entry are healthy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    teeth: BTreeMap<ToothNumber, ClinicalState>,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the records service's JSON object keyed by tooth number.
    ///
    /// Only a document that is not a JSON object is an error; defects inside
    /// individual records are logged and leave that tooth healthy.
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        let records: HashMap<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_values(records))
    }

    /// Build a chart from keyed raw records. Records that are not objects
    /// are skipped.
    pub fn from_values<K: AsRef<str>>(records: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::from_records(records.into_iter().filter_map(|(key, value)| {
            match serde_json::from_value::<ToothRecord>(value) {
                Ok(record) => Some((key, record)),
                Err(err) => {
                    warn!(key = key.as_ref(), %err, "skipping malformed tooth record");
                    None
                }
            }
        }))
    }

    /// Build a chart from keyed records. Keys that are not tooth numbers are skipped.
    pub fn from_records<K: AsRef<str>>(records: impl IntoIterator<Item = (K, ToothRecord)>) -> Self {
        let mut chart = Self::new();
        for (key, record) in records {
            match ToothNumber::parse_key(key.as_ref()) {
                Ok(tooth) => {
                    chart.teeth.insert(tooth, record.to_clinical_state());
                }
                Err(err) => {
                    warn!(key = key.as_ref(), %err, "skipping chart entry with invalid tooth key");
                }
            }
        }
        debug!(entries = chart.teeth.len(), "chart loaded");
        chart
    }

    pub fn set(&mut self, tooth: ToothNumber, state: ClinicalState) {
        self.teeth.insert(tooth, state);
    }

    /// Clinical state for a tooth, defaulting to healthy.
    pub fn state(&self, tooth: ToothNumber) -> ClinicalState {
        self.teeth.get(&tooth).cloned().unwrap_or_default()
    }

    pub fn get(&self, tooth: ToothNumber) -> Option<&ClinicalState> {
        self.teeth.get(&tooth)
    }

    /// Number of explicitly recorded teeth.
    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ToothNumber, &ClinicalState)> {
        self.teeth.iter()
    }

    /// Per-condition counts across all 32 teeth.
    pub fn summary(&self) -> ChartSummary {
        let mut summary = ChartSummary::default();
        for tooth in ToothNumber::all() {
            let state = self.teeth.get(&tooth);
            let condition = state.map(|s| s.condition).unwrap_or_default();
            *summary.conditions.entry(condition).or_insert(0) += 1;
            summary.treatments += state.map(|s| s.treatment_count).unwrap_or(0);
        }
        summary
    }
}

impl FromIterator<(ToothNumber, ClinicalState)> for Chart {
    fn from_iter<T: IntoIterator<Item = (ToothNumber, ClinicalState)>>(iter: T) -> Self {
        Self {
            teeth: iter.into_iter().collect(),
        }
    }
}

/// Legend data for a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub conditions: BTreeMap<Condition, u32>,
    pub treatments: u32,
}

impl ChartSummary {
    pub fn count(&self, condition: Condition) -> u32 {
        self.conditions.get(&condition).copied().unwrap_or(0)
    }
}
