//! Fixed bucket boundaries for age, mileage, and engine size.
//!
//! Every band is closed on its upper edge, so a boundary value always lands
//! in the lower-valued bucket. Mileage and engine bins are also open on the
//! lower edge of the first band: a value of zero (or NaN) falls outside all
//! bins and is encoded as `"nan"`, which is the level the models saw for
//! such rows during training.

use serde::{Deserialize, Serialize};

/// Upper edges of the mileage bands (the last band is unbounded).
pub const MILEAGE_EDGES: [f64; 3] = [50_000.0, 100_000.0, 200_000.0];

/// Upper edges of the engine-size bands, in liters.
pub const ENGINE_EDGES: [f64; 3] = [1.5, 2.5, 3.5];

/// Index of the band `value` falls in, or `None` when it is outside the
/// first band's open lower edge at zero.
fn band(value: f64, edges: &[f64; 3]) -> Option<usize> {
    if value.is_nan() || value <= 0.0 {
        return None;
    }
    Some(edges.iter().position(|edge| value <= *edge).unwrap_or(edges.len()))
}

// ---------------------------------------------------------------------------
// Age
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    New,
    Recent,
    Mature,
    Old,
}

impl AgeCategory {
    /// Negative ages (future model years) bucket as `New`.
    pub fn from_age(age: i32) -> Self {
        if age <= 2 {
            AgeCategory::New
        } else if age <= 5 {
            AgeCategory::Recent
        } else if age <= 10 {
            AgeCategory::Mature
        } else {
            AgeCategory::Old
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::New => "new",
            AgeCategory::Recent => "recent",
            AgeCategory::Mature => "mature",
            AgeCategory::Old => "old",
        }
    }
}

// ---------------------------------------------------------------------------
// Mileage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MileageCategory {
    Low,
    Medium,
    High,
    VeryHigh,
    /// Zero mileage, outside the first bin.
    #[serde(rename = "nan")]
    Unbinned,
}

impl MileageCategory {
    pub fn from_mileage(mileage: f64) -> Self {
        match band(mileage, &MILEAGE_EDGES) {
            Some(0) => MileageCategory::Low,
            Some(1) => MileageCategory::Medium,
            Some(2) => MileageCategory::High,
            Some(_) => MileageCategory::VeryHigh,
            None => MileageCategory::Unbinned,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MileageCategory::Low => "low",
            MileageCategory::Medium => "medium",
            MileageCategory::High => "high",
            MileageCategory::VeryHigh => "very_high",
            MileageCategory::Unbinned => "nan",
        }
    }
}

// ---------------------------------------------------------------------------
// Engine size
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCategory {
    Small,
    Medium,
    Large,
    VeryLarge,
    /// Zero displacement, outside the first bin.
    #[serde(rename = "nan")]
    Unbinned,
}

impl EngineCategory {
    pub fn from_engine_size(liters: f64) -> Self {
        match band(liters, &ENGINE_EDGES) {
            Some(0) => EngineCategory::Small,
            Some(1) => EngineCategory::Medium,
            Some(2) => EngineCategory::Large,
            Some(_) => EngineCategory::VeryLarge,
            None => EngineCategory::Unbinned,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineCategory::Small => "small",
            EngineCategory::Medium => "medium",
            EngineCategory::Large => "large",
            EngineCategory::VeryLarge => "very_large",
            EngineCategory::Unbinned => "nan",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
