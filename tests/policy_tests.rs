#![cfg(feature = "json")]

use boekregel::core::*;

#[test]
fn load_custom_kind_from_json() {
    let policy = LinePolicy::from_json(
        r#"{
            "category": "purchase",
            "excluded_line_types": ["total"],
            "vat_match_status": null,
            "performance_date_requires_services": false,
            "incoming": false,
            "revalidate_on_line_type_change": true
        }"#,
    )
    .unwrap();

    assert_eq!(policy.category, TransactionCategory::Purchase);
    assert!(!policy.allows(LineType::Total));
    assert_eq!(policy.vat_match_status, None);

    let mut line = TransactionLine::new(policy);
    line.set_line_type(LineType::Vat).unwrap();
    // No pin, no services gate.
    line.set_match_status(Some(MatchStatus::Available)).unwrap();
    line.set_performance_date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1))
        .unwrap();
    assert!(line.set_line_type(LineType::Total).is_err());
}

#[test]
fn omitted_flags_use_defaults() {
    let policy = LinePolicy::from_json(r#"{"category":"bank"}"#).unwrap();
    assert_eq!(policy, LinePolicy::for_category(TransactionCategory::Bank));
}

#[test]
fn presets_round_trip() {
    for category in TransactionCategory::ALL {
        let preset = LinePolicy::for_category(category);
        let json = serde_json::to_string(&preset).unwrap();
        assert_eq!(LinePolicy::from_json(&json).unwrap(), preset);
    }
}

#[test]
fn unknown_line_type_is_rejected() {
    let err = LinePolicy::from_json(r#"{"excluded_line_types":["subtotal"]}"#).unwrap_err();
    assert!(err.to_string().contains("subtotal"));
}
