use chrono::{DateTime, Utc};
use search_form::time_range::{TimeRangeInput, TimeRangeKind, TimeRangeSpec, normalize, validate};

fn utc(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn now() -> DateTime<Utc> {
    utc("2024-05-01T10:00:00Z")
}

#[test]
fn test_normalize_during_falls_back_per_field() {
    let raw = TimeRangeInput::during("garbage", "2030-01-01");
    assert_eq!(
        normalize(Some(&raw), now()),
        TimeRangeSpec::During {
            from: now(),
            to: utc("2030-01-01T00:00:00Z"),
        }
    );
}

#[test]
fn test_normalize_relative_defaults() {
    let raw = TimeRangeInput {
        kind: Some("=".to_string()),
        ..TimeRangeInput::default()
    };
    assert_eq!(
        normalize(Some(&raw), now()),
        TimeRangeSpec::Relative {
            last: String::new(),
            unit: "days".to_string(),
        }
    );
}

#[test]
fn test_normalize_relative_passes_values_through() {
    let raw = TimeRangeInput::relative("-3", "fortnights");
    assert_eq!(
        normalize(Some(&raw), now()),
        TimeRangeSpec::Relative {
            last: "-3".to_string(),
            unit: "fortnights".to_string(),
        }
    );
}

#[test]
fn test_normalized_bad_date_still_fails_validation() {
    let raw = TimeRangeInput::after("not a date");
    assert_eq!(normalize(Some(&raw), now()), TimeRangeSpec::After(now()));
    assert_eq!(
        validate(&raw).get("value"),
        Some("A valid date must be selected")
    );
}

#[test]
fn test_validate_missing_type() {
    let errors = validate(&TimeRangeInput::default());
    assert_eq!(errors.get("type"), Some("Type must be supplied"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_validate_during_order() {
    let errors = validate(&TimeRangeInput::during("2020-02-01", "2020-01-01"));
    assert_eq!(errors.get("to"), Some("'To' date must be after 'From' date"));
    assert_eq!(errors.get("from"), Some("'From' date must be before 'To' date"));

    let errors = validate(&TimeRangeInput::during("2020-01-01", "2020-01-01"));
    assert_eq!(errors.len(), 2);

    assert!(validate(&TimeRangeInput::during("2020-01-01", "2020-01-02")).is_empty());
}

#[test]
fn test_validate_during_unparsable_fields() {
    let errors = validate(&TimeRangeInput::during("nope", "2020-01-01"));
    assert_eq!(errors.get("from"), Some("'From' date must be a valid date"));
    assert_eq!(errors.get("to"), None);

    let errors = validate(&TimeRangeInput {
        kind: Some("DURING".to_string()),
        ..TimeRangeInput::default()
    });
    assert_eq!(errors.get("from"), Some("'From' date must be a valid date"));
    assert_eq!(errors.get("to"), Some("'To' date must be a valid date"));
}

#[test]
fn test_validate_relative() {
    for bad in ["", "0", "-1", "abc", "0.5"] {
        let errors = validate(&TimeRangeInput::relative(bad, "days"));
        assert_eq!(
            errors.get("last"),
            Some("Value must be > 0"),
            "last = {:?}",
            bad
        );
    }

    let errors = validate(&TimeRangeInput::relative("3", "weeks"));
    assert_eq!(errors.get("unit"), Some("Must include a valid unit"));
    assert_eq!(errors.get("last"), None);

    for unit in ["minutes", "hours", "days", "months", "years"] {
        assert!(validate(&TimeRangeInput::relative("2", unit)).is_empty());
    }
}

#[test]
fn test_input_deserializes_numbers_as_text() {
    let raw: TimeRangeInput =
        serde_json::from_str(r#"{"type": "=", "last": 7, "unit": "hours"}"#).expect("parses");
    assert_eq!(raw, TimeRangeInput::relative("7", "hours"));
    assert_eq!(raw.range_kind(), Some(TimeRangeKind::Relative));
}
