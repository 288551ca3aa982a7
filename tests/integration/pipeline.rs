//! End-to-end pipeline behaviour with stub specialists.

use chrono::NaiveDate;

use carprice::features::buckets::{AgeCategory, EngineCategory, MileageCategory};
use carprice::features::FeatureEngineer;
use carprice::model::ModelSlot;
use carprice::predictor::{PricePredictor, PricingPipeline, PRICE_THRESHOLD};
use carprice::types::*;

use crate::stub_model::StubModel;

fn new_year_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn corolla() -> RawCarRecord {
    RawCarRecord {
        make: Some("Toyota".to_string()),
        car_type: Some("Corolla".to_string()),
        year: Some(2018),
        mileage: Some(120_000.0),
        gear_type: Some(GearType::Automatic),
        origin: Some(Origin::Saudi),
        options: Some(CarOptions::Full),
        engine_size: Some(2.0),
    }
}

fn pipeline(low: &StubModel, high: &StubModel) -> PricingPipeline {
    PricingPipeline::new(
        FeatureEngineer::with_builtin_tiers().unwrap(),
        PricePredictor::new(ModelSlot::loaded(low.clone()), ModelSlot::loaded(high.clone())),
    )
}

#[test]
fn test_corolla_end_to_end() {
    let low = StubModel::priced(38_000.0);
    let high = StubModel::priced(44_000.0);
    let pipeline = pipeline(&low, &high);

    let features = pipeline.engineer().engineer(&corolla(), new_year_2024()).unwrap();
    assert_eq!(features.car_age, 6);
    assert_eq!(features.age_category, AgeCategory::Mature);
    assert_eq!(features.mileage_category, MileageCategory::High);
    assert_eq!(features.engine_category, EngineCategory::Medium);

    let result = pipeline.estimate(&corolla(), new_year_2024()).unwrap();
    assert!(matches!(
        result.model_used,
        Specialist::LowPrice | Specialist::HighPrice
    ));
    assert!(result.price > 0.0);
    assert_eq!(low.last_make().as_deref(), Some("Toyota"));
}

#[test]
fn test_below_threshold_invokes_each_model_once() {
    let low = StubModel::priced(35_000.0);
    let high = StubModel::priced(PRICE_THRESHOLD - 1.0);
    let result = pipeline(&low, &high).estimate(&corolla(), new_year_2024()).unwrap();

    assert_eq!(result.model_used, Specialist::LowPrice);
    assert!((result.price - 35_000.0).abs() < 1e-6);
    assert_eq!(high.calls(), 1);
    assert_eq!(low.calls(), 1);
}

#[test]
fn test_above_threshold_skips_low_model() {
    let low = StubModel::priced(35_000.0);
    let high = StubModel::priced(120_000.0);
    let result = pipeline(&low, &high).estimate(&corolla(), new_year_2024()).unwrap();

    assert_eq!(result.model_used, Specialist::HighPrice);
    assert!((result.price - 120_000.0).abs() < 1e-6);
    assert_eq!(high.calls(), 1);
    assert_eq!(low.calls(), 0);
}

#[test]
fn test_threshold_estimate_goes_to_high_price_model() {
    let low = StubModel::priced(35_000.0);
    let high = StubModel::with_log(PRICE_THRESHOLD.ln_1p());
    let result = pipeline(&low, &high).estimate(&corolla(), new_year_2024()).unwrap();

    assert_eq!(result.model_used, Specialist::HighPrice);
    assert!((result.price - PRICE_THRESHOLD).abs() < 1e-6);
    assert_eq!(high.calls(), 1);
    assert_eq!(low.calls(), 0);
}

#[test]
fn test_missing_mileage_invokes_no_model() {
    let low = StubModel::priced(35_000.0);
    let high = StubModel::priced(60_000.0);
    let raw = RawCarRecord {
        mileage: None,
        ..corolla()
    };

    let err = pipeline(&low, &high).estimate(&raw, new_year_2024()).unwrap_err();
    assert!(matches!(err, PricingError::MissingField("Mileage")));
    assert_eq!(high.calls(), 0);
    assert_eq!(low.calls(), 0);
}

#[test]
fn test_schema_error_from_low_model_is_surfaced() {
    let low = StubModel::failing();
    let high = StubModel::priced(20_000.0);
    let err = pipeline(&low, &high).estimate(&corolla(), new_year_2024()).unwrap_err();

    assert!(matches!(err, PricingError::FeatureSchemaMismatch { .. }));
    assert_eq!(high.calls(), 1);
    assert_eq!(low.calls(), 1);
}

#[test]
fn test_unavailable_model_never_guesses() {
    let high = StubModel::priced(120_000.0);
    let pipeline = PricingPipeline::new(
        FeatureEngineer::with_builtin_tiers().unwrap(),
        PricePredictor::new(
            ModelSlot::Unavailable {
                reason: "model_low_price.json not found".to_string(),
            },
            ModelSlot::loaded(high.clone()),
        ),
    );

    let err = pipeline.estimate(&corolla(), new_year_2024()).unwrap_err();
    assert!(matches!(err, PricingError::ModelUnavailable { .. }));
    assert_eq!(high.calls(), 0);
}

#[test]
fn test_predictor_shared_across_threads() {
    let low = StubModel::priced(30_000.0);
    let high = StubModel::priced(40_000.0);
    let pipeline = std::sync::Arc::new(pipeline(&low, &high));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || pipeline.estimate(&corolla(), new_year_2024()).unwrap())
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert_eq!(result.model_used, Specialist::LowPrice);
    }
    assert_eq!(high.calls(), 8);
    assert_eq!(low.calls(), 8);
}
