//! Request parameter definitions.
//!
//! These are the knobs the user can turn on the dashboard: the chart
//! [`TimePeriod`], the SEC [`FilingType`] a valuation is based on, the
//! [`GrowthType`] and the [`ValuationStyle`]. Each one round-trips through the
//! exact spelling the analysis service expects on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseParamError;

/// Look-back window for price history and growth calculations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    /// Six months.
    #[serde(rename = "6mo")]
    SixMonths,
    /// One year.
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    /// Two years.
    #[serde(rename = "2y")]
    TwoYears,
    /// Five years.
    #[serde(rename = "5y")]
    FiveYears,
}

impl TimePeriod {
    /// All periods, shortest first.
    pub const ALL: [Self; 4] = [Self::SixMonths, Self::OneYear, Self::TwoYears, Self::FiveYears];

    /// Returns the wire spelling (`6mo`, `1y`, `2y`, `5y`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseParamError::Unknown {
                param: "time period",
                value: s.to_string(),
                expected: "6mo, 1y, 2y, 5y",
            })
    }
}

/// SEC filing a valuation draws its figures from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingType {
    /// Annual report.
    #[default]
    #[serde(rename = "10-K")]
    Annual,
    /// Quarterly report.
    #[serde(rename = "10-Q")]
    Quarterly,
}

impl FilingType {
    /// Returns the wire spelling (`10-K` or `10-Q`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "10-K",
            Self::Quarterly => "10-Q",
        }
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingType {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "10-K" => Ok(Self::Annual),
            "10-Q" => Ok(Self::Quarterly),
            _ => Err(ParseParamError::Unknown {
                param: "filing type",
                value: s.to_string(),
                expected: "10-K, 10-Q",
            }),
        }
    }
}

/// Whether growth is measured from history or from analyst projections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthType {
    /// Compound growth over the selected period.
    #[default]
    Historical,
    /// Forward estimates.
    Forward,
}

impl GrowthType {
    /// Returns the wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Historical => "historical",
            Self::Forward => "forward",
        }
    }
}

impl fmt::Display for GrowthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrowthType {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical" => Ok(Self::Historical),
            "forward" => Ok(Self::Forward),
            _ => Err(ParseParamError::Unknown {
                param: "growth type",
                value: s.to_string(),
                expected: "historical, forward",
            }),
        }
    }
}

/// Valuation ratio the service should compute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValuationStyle {
    /// Price/earnings to growth.
    #[default]
    Peg,
    /// Price/earnings to growth and dividend yield.
    Pegy,
}

impl ValuationStyle {
    /// Returns the wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Peg => "PEG",
            Self::Pegy => "PEGY",
        }
    }
}

impl fmt::Display for ValuationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValuationStyle {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PEG" => Ok(Self::Peg),
            "PEGY" => Ok(Self::Pegy),
            _ => Err(ParseParamError::Unknown {
                param: "valuation style",
                value: s.to_string(),
                expected: "PEG, PEGY",
            }),
        }
    }
}

/// Parameters that identify one valuation request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValuationParams {
    /// Filing the figures come from.
    pub filing: FilingType,
    /// Growth measurement.
    pub growth: GrowthType,
    /// Look-back window.
    pub period: TimePeriod,
    /// Ratio to compute.
    pub style: ValuationStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_period_round_trip() {
        for period in TimePeriod::ALL {
            assert_eq!(period.as_str().parse::<TimePeriod>().unwrap(), period);
        }
        assert!("3y".parse::<TimePeriod>().is_err());
        assert_eq!(TimePeriod::default(), TimePeriod::OneYear);
    }

    #[test]
    fn test_filing_type_is_case_insensitive() {
        assert_eq!("10-k".parse::<FilingType>().unwrap(), FilingType::Annual);
        assert_eq!("10-Q".parse::<FilingType>().unwrap(), FilingType::Quarterly);
        assert!("8-K".parse::<FilingType>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let params = ValuationParams {
            filing: FilingType::Quarterly,
            growth: GrowthType::Forward,
            period: TimePeriod::SixMonths,
            style: ValuationStyle::Pegy,
        };
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filing": "10-Q",
                "growth": "forward",
                "period": "6mo",
                "style": "PEGY"
            })
        );
    }

    #[test]
    fn test_parse_error_message() {
        let err = "weekly".parse::<GrowthType>().unwrap_err();
        assert!(err.to_string().contains("growth type"));
    }
}
