//! Feature engineering.
//!
//! Turns one [`RawCarRecord`] into the engineered record the specialist
//! models were fitted on. The derivation has to match the training
//! notebook exactly: same columns, same bucket edges, same tier lists,
//! same string formats for the interaction features.

pub mod buckets;
pub mod tiers;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::types::{CarOptions, GearType, Origin, PricingError, RawCarRecord};
use buckets::{AgeCategory, EngineCategory, MileageCategory};
use tiers::{BrandTier, TierTable, TypeTier};

/// Column names of an engineered record, in the order they are emitted.
/// `Year` is absent on purpose: the models were trained on `Car_Age`.
pub const FEATURE_NAMES: [&str; 17] = [
    "Make",
    "Type",
    "Mileage",
    "Gear_Type",
    "Origin",
    "Options",
    "Engine_Size",
    "Car_Age",
    "Mileage_per_Year",
    "Brand_Tier",
    "Type_Tier",
    "Age_Category",
    "Mileage_Category",
    "Engine_Category",
    "Age_Mileage_Interaction",
    "Make_x_Type",
    "Make_x_Age",
];

// ---------------------------------------------------------------------------
// Feature values
// ---------------------------------------------------------------------------

/// A single column value as a model sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

impl FeatureValue<'_> {
    pub fn as_categorical(&self) -> Option<&str> {
        match self {
            FeatureValue::Numeric(_) => None,
            FeatureValue::Categorical(s) => Some(*s),
        }
    }
}

impl fmt::Display for FeatureValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{v}"),
            FeatureValue::Categorical(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Engineered record
// ---------------------------------------------------------------------------

/// The model input for one car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineeredFeatureRecord {
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Type")]
    pub car_type: String,
    #[serde(rename = "Mileage")]
    pub mileage: f64,
    #[serde(rename = "Gear_Type")]
    pub gear_type: GearType,
    #[serde(rename = "Origin")]
    pub origin: Origin,
    #[serde(rename = "Options")]
    pub options: CarOptions,
    #[serde(rename = "Engine_Size")]
    pub engine_size: f64,
    #[serde(rename = "Car_Age")]
    pub car_age: i32,
    #[serde(rename = "Mileage_per_Year")]
    pub mileage_per_year: f64,
    #[serde(rename = "Brand_Tier")]
    pub brand_tier: BrandTier,
    #[serde(rename = "Type_Tier")]
    pub type_tier: TypeTier,
    #[serde(rename = "Age_Category")]
    pub age_category: AgeCategory,
    #[serde(rename = "Mileage_Category")]
    pub mileage_category: MileageCategory,
    #[serde(rename = "Engine_Category")]
    pub engine_category: EngineCategory,
    #[serde(rename = "Age_Mileage_Interaction")]
    pub age_mileage_interaction: f64,
    #[serde(rename = "Make_x_Type")]
    pub make_x_type: String,
    #[serde(rename = "Make_x_Age")]
    pub make_x_age: String,
}

impl EngineeredFeatureRecord {
    /// Names of every column this record provides.
    pub fn field_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    /// Look up a column by its training name.
    pub fn get(&self, name: &str) -> Option<FeatureValue<'_>> {
        use FeatureValue::{Categorical, Numeric};

        let value = match name {
            "Make" => Categorical(self.make.as_str()),
            "Type" => Categorical(self.car_type.as_str()),
            "Mileage" => Numeric(self.mileage),
            "Gear_Type" => Categorical(self.gear_type.as_str()),
            "Origin" => Categorical(self.origin.as_str()),
            "Options" => Categorical(self.options.as_str()),
            "Engine_Size" => Numeric(self.engine_size),
            "Car_Age" => Numeric(f64::from(self.car_age)),
            "Mileage_per_Year" => Numeric(self.mileage_per_year),
            "Brand_Tier" => Categorical(self.brand_tier.as_str()),
            "Type_Tier" => Categorical(self.type_tier.as_str()),
            "Age_Category" => Categorical(self.age_category.as_str()),
            "Mileage_Category" => Categorical(self.mileage_category.as_str()),
            "Engine_Category" => Categorical(self.engine_category.as_str()),
            "Age_Mileage_Interaction" => Numeric(self.age_mileage_interaction),
            "Make_x_Type" => Categorical(self.make_x_type.as_str()),
            "Make_x_Age" => Categorical(self.make_x_age.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// Engineer
// ---------------------------------------------------------------------------

/// Derives engineered records using a fixed tier table.
///
/// Holds no mutable state; one instance can serve any number of requests.
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    tiers: TierTable,
}

impl FeatureEngineer {
    pub fn new(tiers: TierTable) -> Self {
        Self { tiers }
    }

    /// An engineer using the built-in training-time tier table.
    pub fn with_builtin_tiers() -> Result<Self, PricingError> {
        Ok(Self::new(TierTable::builtin()?))
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Build the engineered record for `raw` as of `today`.
    ///
    /// Only `today`'s calendar year is used. A model year after `today`
    /// yields a negative `Car_Age` and is passed through unchanged.
    pub fn engineer(
        &self,
        raw: &RawCarRecord,
        today: NaiveDate,
    ) -> Result<EngineeredFeatureRecord, PricingError> {
        let make = require(raw.make.as_ref(), "Make")?;
        let car_type = require(raw.car_type.as_ref(), "Type")?;
        let year = *require(raw.year.as_ref(), "Year")?;
        let mileage = non_negative(*require(raw.mileage.as_ref(), "Mileage")?, "Mileage")?;
        let gear_type = *require(raw.gear_type.as_ref(), "Gear_Type")?;
        let origin = *require(raw.origin.as_ref(), "Origin")?;
        let options = *require(raw.options.as_ref(), "Options")?;
        let engine_size =
            non_negative(*require(raw.engine_size.as_ref(), "Engine_Size")?, "Engine_Size")?;

        let car_age = today
            .year()
            .checked_sub(year)
            .ok_or(PricingError::InvalidRange { field: "Year", value: f64::from(year) })?;
        let age = f64::from(car_age);

        Ok(EngineeredFeatureRecord {
            make: make.clone(),
            car_type: car_type.clone(),
            mileage,
            gear_type,
            origin,
            options,
            engine_size,
            car_age,
            mileage_per_year: mileage / (age + 1.0),
            brand_tier: self.tiers.brand_tier(make),
            type_tier: self.tiers.type_tier(car_type),
            age_category: AgeCategory::from_age(car_age),
            mileage_category: MileageCategory::from_mileage(mileage),
            engine_category: EngineCategory::from_engine_size(engine_size),
            age_mileage_interaction: age * mileage / 1000.0,
            make_x_type: format!("{make}_{car_type}"),
            make_x_age: format!("{make}_age_{car_age}"),
        })
    }
}

fn require<'a, T>(value: Option<&'a T>, field: &'static str) -> Result<&'a T, PricingError> {
    value.ok_or(PricingError::MissingField(field))
}

fn non_negative(value: f64, field: &'static str) -> Result<f64, PricingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::InvalidRange { field, value });
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
