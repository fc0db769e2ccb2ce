//! Normalization of date-keyed mappings into time series.
//!
//! The analysis service reports most metrics as JSON objects mapping a date
//! string to a value. Keys come in several date spellings and values are not
//! always numeric. [`normalize`] keeps only the entries that parse on both
//! sides and returns them as a [`TimeSeries`] ordered by timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Naive date-time layouts accepted for series keys.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Date-only layouts accepted for series keys.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A single observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// When the value was observed.
    pub timestamp: DateTime<Utc>,
    /// The observed value; always finite.
    pub value: f64,
}

/// Ordered sequence of [`SeriesPoint`]s.
///
/// Timestamps are strictly increasing and every value is finite. An empty
/// series is valid and means there is nothing to chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SeriesPoint>", into = "Vec<SeriesPoint>")]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Builds a series from arbitrary points.
    ///
    /// Non-finite values are dropped, points are sorted by timestamp, and of
    /// several points sharing a timestamp the one that came last wins.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = SeriesPoint>) -> Self {
        let mut points: Vec<SeriesPoint> =
            points.into_iter().filter(|p| p.value.is_finite()).collect();
        // Stable sort keeps input order among equal timestamps.
        points.sort_by_key(|p| p.timestamp);

        let mut deduped: Vec<SeriesPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }
        Self { points: deduped }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the points in timestamp order.
    #[must_use]
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Returns an iterator over the points.
    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    /// Returns the earliest point.
    #[must_use]
    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    /// Returns the latest point.
    #[must_use]
    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Returns the smallest and largest values, for axis scaling.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.value;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(p.value), hi.max(p.value))),
        )
    }

    /// Consumes the series and returns the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<SeriesPoint> {
        self.points
    }

    /// Renders the series back into a date-keyed mapping with RFC 3339 keys.
    ///
    /// Normalizing the result yields the same series.
    #[must_use]
    pub fn to_mapping(&self) -> Map<String, Value> {
        self.points
            .iter()
            .map(|p| {
                (
                    p.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    Value::from(p.value),
                )
            })
            .collect()
    }

    /// Converts the series to a DataFrame with `timestamp` and `value` columns.
    ///
    /// # Errors
    ///
    /// Returns any error raised by polars while building the frame.
    #[cfg(feature = "polars")]
    pub fn to_dataframe(&self) -> polars::prelude::PolarsResult<polars::prelude::DataFrame> {
        use polars::prelude::*;

        let millis: Vec<i64> = self
            .points
            .iter()
            .map(|p| p.timestamp.timestamp_millis())
            .collect();
        let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();

        DataFrame::new(vec![
            Column::new("timestamp".into(), millis),
            Column::new("value".into(), values),
        ])?
        .lazy()
        .with_column(col("timestamp").cast(DataType::Datetime(TimeUnit::Milliseconds, None)))
        .collect()
    }
}

impl From<Vec<SeriesPoint>> for TimeSeries {
    fn from(points: Vec<SeriesPoint>) -> Self {
        Self::from_points(points)
    }
}

impl From<TimeSeries> for Vec<SeriesPoint> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

impl IntoIterator for TimeSeries {
    type Item = SeriesPoint;
    type IntoIter = std::vec::IntoIter<SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a SeriesPoint;
    type IntoIter = std::slice::Iter<'a, SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Parses a series key into a UTC timestamp.
///
/// Accepts RFC 3339, RFC 2822 (`Mon, 01 Jan 2024 00:00:00 GMT`), ISO date-times
/// with or without a `T` separator or offset, `YYYY-MM-DD` and `MM/DD/YYYY`.
/// Date-only keys resolve to midnight UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Coerces a JSON value to a finite number.
///
/// Numbers pass through; strings are parsed after trimming. Anything else, and
/// any non-finite result, yields `None`.
#[must_use]
pub fn coerce_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Normalizes a date-keyed mapping into a [`TimeSeries`].
///
/// Entries whose key is not a date or whose value is not numeric are dropped.
/// The result may be empty.
#[must_use]
pub fn normalize(raw: &Map<String, Value>) -> TimeSeries {
    TimeSeries::from_points(raw.iter().filter_map(|(key, value)| {
        Some(SeriesPoint {
            timestamp: parse_timestamp(key)?,
            value: coerce_value(value)?,
        })
    }))
}

/// Normalizes any JSON value: objects go through [`normalize`], everything
/// else becomes the empty series.
#[must_use]
pub fn normalize_value(raw: &Value) -> TimeSeries {
    raw.as_object().map(normalize).unwrap_or_default()
}

/// Converts the `History` rows of a price-history response into a
/// date-to-close mapping.
///
/// Each row is an object carrying `Date` and `Close`; rows missing either are
/// skipped. Anything other than an array yields an empty mapping.
#[must_use]
pub fn history_mapping(rows: &Value) -> Map<String, Value> {
    let Some(rows) = rows.as_array() else {
        return Map::new();
    };
    rows.iter()
        .filter_map(|row| {
            let date = row.get("Date")?.as_str()?;
            let close = row.get("Close")?;
            Some((date.to_string(), close.clone()))
        })
        .collect()
}
