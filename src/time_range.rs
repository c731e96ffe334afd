//! Time range normalization and validation
//!
//! The editor stores a time range as loosely-typed input ([`TimeRangeInput`]):
//! the range type, dates as text and the relative offset as text. Two steps
//! run over that input at different times:
//!
//! - [`normalize`] coerces it into one of the canonical shapes of
//!   [`TimeRangeSpec`], absorbing unparsable dates into "now" so the editor
//!   always has something to render.
//! - [`validate`] inspects the same input on submit and reports, per field,
//!   everything that keeps it from being usable in a query.

mod dates;

pub use dates::{format_date, parse_date};

use crate::filter::ComparisonOperator;
use crate::validation::ErrorSet;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static RELATIVE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^RELATIVE\((PT?)(\d+(?:\.\d+)?)([MHDY])\)$").expect("valid relative value regex")
});

/// Offsets that fit an ISO 8601 duration as written
static RELATIVE_LAST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid relative offset regex"));

/// Unit of a relative time offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeUnit {
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl RelativeUnit {
    pub const ALL: [RelativeUnit; 5] = [
        RelativeUnit::Minutes,
        RelativeUnit::Hours,
        RelativeUnit::Days,
        RelativeUnit::Months,
        RelativeUnit::Years,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeUnit::Minutes => "minutes",
            RelativeUnit::Hours => "hours",
            RelativeUnit::Days => "days",
            RelativeUnit::Months => "months",
            RelativeUnit::Years => "years",
        }
    }

    /// ISO 8601 duration prefix and designator for this unit
    fn designator(&self) -> (&'static str, char) {
        match self {
            RelativeUnit::Minutes => ("PT", 'M'),
            RelativeUnit::Hours => ("PT", 'H'),
            RelativeUnit::Days => ("P", 'D'),
            RelativeUnit::Months => ("P", 'M'),
            RelativeUnit::Years => ("P", 'Y'),
        }
    }

    fn from_designator(prefix: &str, designator: &str) -> Option<Self> {
        match (prefix, designator) {
            ("PT", "M") => Some(RelativeUnit::Minutes),
            ("PT", "H") => Some(RelativeUnit::Hours),
            ("P", "D") => Some(RelativeUnit::Days),
            ("P", "M") => Some(RelativeUnit::Months),
            ("P", "Y") => Some(RelativeUnit::Years),
            _ => None,
        }
    }
}

impl FromStr for RelativeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelativeUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| format!("Unknown relative unit: '{}'", s))
    }
}

impl fmt::Display for RelativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four range types the editor offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRangeKind {
    After,
    Before,
    During,
    Relative,
}

impl TimeRangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeKind::After => "AFTER",
            TimeRangeKind::Before => "BEFORE",
            TimeRangeKind::During => "DURING",
            TimeRangeKind::Relative => "=",
        }
    }

    pub fn operator(&self) -> ComparisonOperator {
        match self {
            TimeRangeKind::After => ComparisonOperator::After,
            TimeRangeKind::Before => ComparisonOperator::Before,
            TimeRangeKind::During => ComparisonOperator::During,
            TimeRangeKind::Relative => ComparisonOperator::Relative,
        }
    }
}

impl FromStr for TimeRangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AFTER" => Ok(TimeRangeKind::After),
            "BEFORE" => Ok(TimeRangeKind::Before),
            "DURING" => Ok(TimeRangeKind::During),
            "=" => Ok(TimeRangeKind::Relative),
            _ => Err(format!("Unknown time range type: '{}'", s)),
        }
    }
}

/// Time range as edited: every field optional, dates and offsets as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeInput {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl TimeRangeInput {
    pub fn after(value: impl Into<String>) -> Self {
        Self {
            kind: Some(TimeRangeKind::After.as_str().to_string()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn before(value: impl Into<String>) -> Self {
        Self {
            kind: Some(TimeRangeKind::Before.as_str().to_string()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn during(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: Some(TimeRangeKind::During.as_str().to_string()),
            from: Some(from.into()),
            to: Some(to.into()),
            ..Self::default()
        }
    }

    pub fn relative(last: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            kind: Some(TimeRangeKind::Relative.as_str().to_string()),
            last: Some(last.into()),
            unit: Some(unit.into()),
            ..Self::default()
        }
    }

    /// The recognized range type, `None` when missing or unknown
    pub fn range_kind(&self) -> Option<TimeRangeKind> {
        self.kind.as_deref().and_then(|kind| kind.parse().ok())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Canonical time range shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeSpec {
    /// No range type chosen yet
    Untyped,
    After(DateTime<Utc>),
    Before(DateTime<Utc>),
    During {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// Offset back from now; `last` stays text until validated
    Relative {
        last: String,
        unit: String,
    },
}

impl TimeRangeSpec {
    pub fn kind(&self) -> Option<TimeRangeKind> {
        match self {
            TimeRangeSpec::Untyped => None,
            TimeRangeSpec::After(_) => Some(TimeRangeKind::After),
            TimeRangeSpec::Before(_) => Some(TimeRangeKind::Before),
            TimeRangeSpec::During { .. } => Some(TimeRangeKind::During),
            TimeRangeSpec::Relative { .. } => Some(TimeRangeKind::Relative),
        }
    }

    /// Operator and wire value of the comparison this range resolves to
    ///
    /// Returns `None` for an untyped range or a relative range whose unit
    /// is not recognized; those never pass validation.
    pub fn to_comparison(&self) -> Option<(ComparisonOperator, Value)> {
        match self {
            TimeRangeSpec::Untyped => None,
            TimeRangeSpec::After(value) => {
                Some((ComparisonOperator::After, Value::String(format_date(value))))
            }
            TimeRangeSpec::Before(value) => {
                Some((ComparisonOperator::Before, Value::String(format_date(value))))
            }
            TimeRangeSpec::During { from, to } => Some((
                ComparisonOperator::During,
                Value::String(format!("{}/{}", format_date(from), format_date(to))),
            )),
            TimeRangeSpec::Relative { last, unit } => {
                let unit: RelativeUnit = unit.parse().ok()?;
                let (prefix, designator) = unit.designator();
                Some((
                    ComparisonOperator::Relative,
                    Value::String(format!("RELATIVE({}{}{})", prefix, last, designator)),
                ))
            }
        }
    }

    /// Decode a comparison produced by [`TimeRangeSpec::to_comparison`]
    pub fn from_comparison(operator: ComparisonOperator, value: &Value) -> Option<Self> {
        let text = value.as_str()?;
        match operator {
            ComparisonOperator::After => parse_date(text).map(TimeRangeSpec::After),
            ComparisonOperator::Before => parse_date(text).map(TimeRangeSpec::Before),
            ComparisonOperator::During => {
                let (from, to) = text.split_once('/')?;
                Some(TimeRangeSpec::During {
                    from: parse_date(from)?,
                    to: parse_date(to)?,
                })
            }
            ComparisonOperator::Relative => {
                let captures = RELATIVE_VALUE_RE.captures(text.trim())?;
                let unit = RelativeUnit::from_designator(&captures[1], &captures[3])?;
                Some(TimeRangeSpec::Relative {
                    last: captures[2].to_string(),
                    unit: unit.as_str().to_string(),
                })
            }
            _ => None,
        }
    }
}

impl From<&TimeRangeSpec> for TimeRangeInput {
    fn from(spec: &TimeRangeSpec) -> Self {
        match spec {
            TimeRangeSpec::Untyped => TimeRangeInput::default(),
            TimeRangeSpec::After(value) => TimeRangeInput::after(format_date(value)),
            TimeRangeSpec::Before(value) => TimeRangeInput::before(format_date(value)),
            TimeRangeSpec::During { from, to } => {
                TimeRangeInput::during(format_date(from), format_date(to))
            }
            TimeRangeSpec::Relative { last, unit } => TimeRangeInput::relative(last, unit),
        }
    }
}

/// Coerce editor input into a canonical range
///
/// Missing input or a missing/unknown type yields [`TimeRangeSpec::Untyped`].
/// Dates that fail to parse become `now`; a relative range keeps `last`
/// as-is (default empty) and defaults `unit` to days.
pub fn normalize(raw: Option<&TimeRangeInput>, now: DateTime<Utc>) -> TimeRangeSpec {
    let Some(raw) = raw else {
        return TimeRangeSpec::Untyped;
    };
    let Some(kind) = raw.range_kind() else {
        if let Some(kind) = &raw.kind {
            tracing::debug!(kind = %kind, "unknown time range type treated as untyped");
        }
        return TimeRangeSpec::Untyped;
    };

    match kind {
        TimeRangeKind::During => TimeRangeSpec::During {
            from: date_with_fallback("from", raw.from.as_deref(), now),
            to: date_with_fallback("to", raw.to.as_deref(), now),
        },
        TimeRangeKind::Relative => TimeRangeSpec::Relative {
            last: raw.last.clone().unwrap_or_default(),
            unit: raw
                .unit
                .clone()
                .unwrap_or_else(|| RelativeUnit::Days.as_str().to_string()),
        },
        TimeRangeKind::After => {
            TimeRangeSpec::After(date_with_fallback("value", raw.value.as_deref(), now))
        }
        TimeRangeKind::Before => {
            TimeRangeSpec::Before(date_with_fallback("value", raw.value.as_deref(), now))
        }
    }
}

fn date_with_fallback(field: &str, input: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    match input.and_then(parse_date) {
        Some(date) => date,
        None => {
            tracing::debug!(field, input = ?input, "unparsable date replaced with now");
            now
        }
    }
}

/// Report every field of a time range that keeps it out of a query
pub fn validate(range: &TimeRangeInput) -> ErrorSet {
    let mut errors = ErrorSet::new();

    match range.range_kind() {
        None => {
            errors.insert("type", "Type must be supplied");
        }
        Some(TimeRangeKind::During) => {
            let to = range.to.as_deref().and_then(parse_date);
            if to.is_none() {
                errors.insert("to", "'To' date must be a valid date");
            }

            let from = range.from.as_deref().and_then(parse_date);
            if from.is_none() {
                errors.insert("from", "'From' date must be a valid date");
            }

            if let (Some(from), Some(to)) = (from, to)
                && from >= to
            {
                errors.insert("to", "'To' date must be after 'From' date");
                errors.insert("from", "'From' date must be before 'To' date");
            }
        }
        Some(TimeRangeKind::Relative) => {
            let last = range
                .last
                .as_deref()
                .filter(|last| RELATIVE_LAST_RE.is_match(last))
                .and_then(|last| last.parse::<f64>().ok());
            if !last.is_some_and(|last| last.is_finite() && last >= 1.0) {
                errors.insert("last", "Value must be > 0");
            }

            let unit = range.unit.as_deref().map(str::parse::<RelativeUnit>);
            if !matches!(unit, Some(Ok(_))) {
                errors.insert("unit", "Must include a valid unit");
            }
        }
        Some(TimeRangeKind::After | TimeRangeKind::Before) => {
            if range.value.as_deref().and_then(parse_date).is_none() {
                errors.insert("value", "A valid date must be selected");
            }
        }
    }

    errors
}
