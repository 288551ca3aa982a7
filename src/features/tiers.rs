//! Brand and model tier lookup.
//!
//! The tier lists are training-time data, not business rules, so they are
//! loaded from a versioned TOML table instead of being written into the
//! feature code. A built-in copy of the table ships with the binary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::types::PricingError;

/// The table the shipped models were fitted with.
const BUILTIN_TIERS: &str = include_str!("../../data/tiers.toml");

// ---------------------------------------------------------------------------
// Tier values
// ---------------------------------------------------------------------------

/// Coarse grouping of a car's make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandTier {
    Luxury,
    Premium,
    Economy,
}

impl BrandTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrandTier::Luxury => "luxury",
            BrandTier::Premium => "premium",
            BrandTier::Economy => "economy",
        }
    }
}

/// Coarse grouping of a car's model/trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTier {
    LuxuryType,
    PremiumType,
    EconomyType,
}

impl TypeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTier::LuxuryType => "luxury_type",
            TypeTier::PremiumType => "premium_type",
            TypeTier::EconomyType => "economy_type",
        }
    }
}

// ---------------------------------------------------------------------------
// Table file format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TierFile {
    version: String,
    brand: TierLists,
    #[serde(rename = "type")]
    car_type: TierLists,
}

#[derive(Debug, Deserialize)]
struct TierLists {
    luxury: Vec<String>,
    premium: Vec<String>,
}

// ---------------------------------------------------------------------------
// Lookup table
// ---------------------------------------------------------------------------

/// Membership sets for brand and type tiers.
///
/// Luxury membership is checked before premium; anything in neither list
/// falls back to the economy tier.
#[derive(Debug, Clone)]
pub struct TierTable {
    version: String,
    luxury_brands: HashSet<String>,
    premium_brands: HashSet<String>,
    luxury_types: HashSet<String>,
    premium_types: HashSet<String>,
}

impl TierTable {
    /// The table embedded in the binary.
    pub fn builtin() -> Result<Self, PricingError> {
        Self::from_toml_str(BUILTIN_TIERS)
    }

    /// Load a table from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, PricingError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PricingError::TierTable(format!("failed to read {}: {e}", path.display()))
        })?;
        let table = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), version = %table.version, "Tier table loaded");
        Ok(table)
    }

    /// Parse a table from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, PricingError> {
        let file: TierFile = toml::from_str(contents)
            .map_err(|e| PricingError::TierTable(format!("failed to parse tier table: {e}")))?;

        if file.version.trim().is_empty() {
            return Err(PricingError::TierTable("version must not be empty".to_string()));
        }

        let lists = [
            ("brand.luxury", &file.brand.luxury),
            ("brand.premium", &file.brand.premium),
            ("type.luxury", &file.car_type.luxury),
            ("type.premium", &file.car_type.premium),
        ];
        for (name, list) in lists {
            if list.iter().any(|entry| entry.trim().is_empty()) {
                return Err(PricingError::TierTable(format!("{name} contains a blank entry")));
            }
        }

        Ok(Self {
            version: file.version,
            luxury_brands: file.brand.luxury.into_iter().collect(),
            premium_brands: file.brand.premium.into_iter().collect(),
            luxury_types: file.car_type.luxury.into_iter().collect(),
            premium_types: file.car_type.premium.into_iter().collect(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Tier for a make. Exact, case-sensitive match.
    pub fn brand_tier(&self, make: &str) -> BrandTier {
        if self.luxury_brands.contains(make) {
            BrandTier::Luxury
        } else if self.premium_brands.contains(make) {
            BrandTier::Premium
        } else {
            BrandTier::Economy
        }
    }

    /// Tier for a model/trim. Exact, case-sensitive match.
    pub fn type_tier(&self, car_type: &str) -> TypeTier {
        if self.luxury_types.contains(car_type) {
            TypeTier::LuxuryType
        } else if self.premium_types.contains(car_type) {
            TypeTier::PremiumType
        } else {
            TypeTier::EconomyType
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
