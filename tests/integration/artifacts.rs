//! Loading the shipped model artifacts and tier table from disk.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use carprice::config::AppConfig;
use carprice::features::tiers::TierTable;
use carprice::features::{FeatureEngineer, FEATURE_NAMES};
use carprice::model::{ArtifactModel, ModelSlot, PriceModel};
use carprice::predictor::{PricePredictor, PricingPipeline};
use carprice::types::*;

fn crate_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn temp_path(ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("carprice_it_{}.{ext}", uuid::Uuid::new_v4()))
}

fn shipped_pipeline() -> PricingPipeline {
    PricingPipeline::new(
        FeatureEngineer::new(TierTable::load(&crate_path("data/tiers.toml")).unwrap()),
        PricePredictor::new(
            ModelSlot::loaded(ArtifactModel::load(&crate_path("models/model_low_price.json")).unwrap()),
            ModelSlot::loaded(ArtifactModel::load(&crate_path("models/model_high_price.json")).unwrap()),
        ),
    )
}

#[test]
fn test_shipped_artifacts_match_feature_schema() {
    for file in ["models/model_low_price.json", "models/model_high_price.json"] {
        let model = ArtifactModel::load(&crate_path(file)).unwrap();
        let expected: Vec<&str> = model.schema().iter().map(String::as_str).collect();
        let mut names = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        assert_eq!(expected, names, "{file}");
    }
}

#[test]
fn test_shipped_models_price_the_corolla() {
    let raw = RawCarRecord {
        make: Some("Toyota".to_string()),
        car_type: Some("Corolla".to_string()),
        year: Some(2018),
        mileage: Some(120_000.0),
        gear_type: Some(GearType::Automatic),
        origin: Some(Origin::Saudi),
        options: Some(CarOptions::Full),
        engine_size: Some(2.0),
    };
    let result = shipped_pipeline()
        .estimate(&raw, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .unwrap();

    // The high-price model's gate lands near 44k, so the low model answers.
    assert_eq!(result.model_used, Specialist::LowPrice);
    assert!(result.price > 30_000.0 && result.price < 50_000.0);
}

#[test]
fn test_shipped_models_price_a_luxury_suv() {
    let raw = RawCarRecord {
        make: Some("Lexus".to_string()),
        car_type: Some("LX".to_string()),
        year: Some(2022),
        mileage: Some(30_000.0),
        gear_type: Some(GearType::Automatic),
        origin: Some(Origin::GulfArabic),
        options: Some(CarOptions::Full),
        engine_size: Some(5.7),
    };
    let result = shipped_pipeline()
        .estimate(&raw, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .unwrap();

    assert_eq!(result.model_used, Specialist::HighPrice);
    assert!(result.price >= 49_000.0);
}

#[test]
fn test_mismatched_artifact_rejects_engineered_record() {
    let path = temp_path("json");
    let artifact = serde_json::json!({
        "name": "stale-model",
        "features": ["Make", "Type", "Year", "Mileage"],
        "kind": "linear",
        "intercept": 10.0,
        "numeric": { "Mileage": -0.000001 }
    });
    std::fs::write(&path, artifact.to_string()).unwrap();

    let model = ArtifactModel::load(&path).unwrap();
    let features = FeatureEngineer::with_builtin_tiers()
        .unwrap()
        .engineer(
            &RawCarRecord {
                make: Some("Kia".to_string()),
                car_type: Some("Rio".to_string()),
                year: Some(2020),
                mileage: Some(60_000.0),
                gear_type: Some(GearType::Manual),
                origin: Some(Origin::Other),
                options: Some(CarOptions::Standard),
                engine_size: Some(1.4),
            },
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();

    match model.predict(&features) {
        Err(PricingError::FeatureSchemaMismatch { missing, unexpected, .. }) => {
            assert_eq!(missing, vec!["Year".to_string()]);
            assert_eq!(unexpected.len(), FEATURE_NAMES.len() - 3);
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_custom_tier_table_changes_tiers_only() {
    let path = temp_path("toml");
    std::fs::write(
        &path,
        r#"
        version = "test"
        [brand]
        luxury = ["Tesla"]
        premium = []
        [type]
        luxury = []
        premium = ["Corolla"]
        "#,
    )
    .unwrap();

    let engineer = FeatureEngineer::new(TierTable::load(&path).unwrap());
    let raw = RawCarRecord {
        make: Some("Toyota".to_string()),
        car_type: Some("Corolla".to_string()),
        year: Some(2018),
        mileage: Some(120_000.0),
        gear_type: Some(GearType::Automatic),
        origin: Some(Origin::Saudi),
        options: Some(CarOptions::Full),
        engine_size: Some(2.0),
    };
    let rec = engineer
        .engineer(&raw, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .unwrap();
    assert_eq!(rec.brand_tier.as_str(), "economy");
    assert_eq!(rec.type_tier.as_str(), "premium_type");
    assert_eq!(rec.car_age, 6);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_repo_config_points_at_shipped_models() {
    let cfg = AppConfig::load(crate_path("config.toml").to_str().unwrap()).unwrap();
    assert!(crate_path(cfg.models.low_path.to_str().unwrap()).exists());
    assert!(crate_path(cfg.models.high_path.to_str().unwrap()).exists());
    assert!(cfg.models.require_at_startup);
}
