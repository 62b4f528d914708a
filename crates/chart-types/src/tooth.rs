use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::ChartError;

/// The anatomical shape class of a tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToothArchetype {
    Incisor,
    Canine,
    Premolar,
    Molar,
}

impl ToothArchetype {
    pub const ALL: [ToothArchetype; 4] = [
        ToothArchetype::Incisor,
        ToothArchetype::Canine,
        ToothArchetype::Premolar,
        ToothArchetype::Molar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToothArchetype::Incisor => "incisor",
            ToothArchetype::Canine => "canine",
            ToothArchetype::Premolar => "premolar",
            ToothArchetype::Molar => "molar",
        }
    }
}

/// Upper (maxillary) or lower (mandibular) arch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arch {
    Upper,
    Lower,
}

/// One of the four runs of eight teeth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl Quadrant {
    pub fn arch(&self) -> Arch {
        match self {
            Quadrant::UpperRight | Quadrant::UpperLeft => Arch::Upper,
            Quadrant::LowerLeft | Quadrant::LowerRight => Arch::Lower,
        }
    }

    /// Sign of the x coordinate for teeth in this run.
    pub fn side(&self) -> f64 {
        match self {
            Quadrant::UpperRight | Quadrant::LowerLeft => 1.0,
            Quadrant::UpperLeft | Quadrant::LowerRight => -1.0,
        }
    }
}

use ToothArchetype::{Canine as C, Incisor as I, Molar as M, Premolar as P};

/// Archetype per tooth number (index 0 is tooth 1). Each run places its
/// incisors at the midline end (t = 0) and its molars at the posterior end.
#[rustfmt::skip]
const ARCHETYPES: [ToothArchetype; 32] = [
    I, I, C, P, P, M, M, M,   // 1-8
    I, I, C, P, P, M, M, M,   // 9-16
    M, M, M, P, P, C, I, I,   // 17-24 (reversed run)
    I, I, C, P, P, M, M, M,   // 25-32
];

/// A tooth number in 1..=32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToothNumber(u8);

impl ToothNumber {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 32;

    pub fn new(value: u8) -> Result<Self, ChartError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ChartError::InvalidToothNumber {
                value: value as i64,
            })
        }
    }

    /// Parse a chart key such as `"8"`.
    pub fn parse_key(key: &str) -> Result<Self, ChartError> {
        let value: i64 = key
            .trim()
            .parse()
            .map_err(|_| ChartError::InvalidToothKey {
                key: key.to_string(),
            })?;
        Self::try_from(value)
    }

    /// All 32 tooth numbers in ascending order.
    pub fn all() -> impl Iterator<Item = ToothNumber> {
        (Self::MIN..=Self::MAX).map(ToothNumber)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn quadrant(&self) -> Quadrant {
        match self.0 {
            1..=8 => Quadrant::UpperRight,
            9..=16 => Quadrant::UpperLeft,
            17..=24 => Quadrant::LowerLeft,
            _ => Quadrant::LowerRight,
        }
    }

    pub fn arch(&self) -> Arch {
        self.quadrant().arch()
    }

    pub fn side(&self) -> f64 {
        self.quadrant().side()
    }

    /// Normalized position along the run: 0 at the midline, 1 at the back.
    pub fn arch_param(&self) -> f64 {
        let n = self.0 as f64;
        match self.quadrant() {
            Quadrant::UpperRight => (n - 1.0) / 7.0,
            Quadrant::UpperLeft => (n - 9.0) / 7.0,
            Quadrant::LowerLeft => (24.0 - n) / 7.0,
            Quadrant::LowerRight => (n - 25.0) / 7.0,
        }
    }

    pub fn archetype(&self) -> ToothArchetype {
        ARCHETYPES[(self.0 - 1) as usize]
    }
}

impl TryFrom<u8> for ToothNumber {
    type Error = ChartError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for ToothNumber {
    type Error = ChartError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ChartError::InvalidToothNumber { value })
            .and_then(Self::new)
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ToothNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToothNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        ToothNumber::new(value).map_err(serde::de::Error::custom)
    }
}
