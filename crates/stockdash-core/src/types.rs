//! Resource identity types.
//!
//! - [`Ticker`] - Trading symbol
//! - [`ResourceKind`] - The five fetchable resource families
//! - [`ResourceKey`] - Full identity of one fetchable unit

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::params::{TimePeriod, ValuationParams};

/// A trading symbol/ticker.
///
/// Tickers are trimmed and uppercased on creation. An empty ticker can be
/// constructed; fetchers reject it with a missing-input error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no symbol was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Family of a fetchable resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Bulk snapshot: company information, market data and financial ratios.
    Snapshot,
    /// Historical closing prices.
    History,
    /// Valuation ratios and growth data.
    Valuation,
    /// AI narrative text.
    AiSummary,
    /// Lightweight current price.
    PriceQuote,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Snapshot => "snapshot",
            Self::History => "history",
            Self::Valuation => "valuation",
            Self::AiSummary => "ai-summary",
            Self::PriceQuote => "price-quote",
        };
        f.write_str(name)
    }
}

/// Identity of one fetchable unit: its kind, ticker and kind-specific
/// parameters. Two keys are equal exactly when they would issue the same
/// request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKey {
    /// Bulk snapshot for a ticker.
    Snapshot(Ticker),
    /// Price history for a ticker over a period.
    History(Ticker, TimePeriod),
    /// Valuation for a ticker under the given parameters.
    Valuation(Ticker, ValuationParams),
    /// AI narrative for a ticker.
    AiSummary(Ticker),
    /// Current price for a ticker.
    PriceQuote(Ticker),
}

impl ResourceKey {
    /// Returns the resource family of this key.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Snapshot(_) => ResourceKind::Snapshot,
            Self::History(..) => ResourceKind::History,
            Self::Valuation(..) => ResourceKind::Valuation,
            Self::AiSummary(_) => ResourceKind::AiSummary,
            Self::PriceQuote(_) => ResourceKind::PriceQuote,
        }
    }

    /// Returns the ticker this key refers to.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        match self {
            Self::Snapshot(t)
            | Self::History(t, _)
            | Self::Valuation(t, _)
            | Self::AiSummary(t)
            | Self::PriceQuote(t) => t,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History(ticker, period) => write!(f, "history:{ticker}:{period}"),
            Self::Valuation(ticker, p) => write!(
                f,
                "valuation:{ticker}:{}:{}:{}:{}",
                p.filing, p.growth, p.period, p.style
            ),
            other => write!(f, "{}:{}", other.kind(), other.ticker()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalization() {
        assert_eq!(Ticker::new(" aapl ").as_str(), "AAPL");
        assert!(Ticker::new("   ").is_empty());
        assert_eq!("msft".parse::<Ticker>().unwrap(), Ticker::from("MSFT"));
    }

    #[test]
    fn test_key_identity() {
        let a = ResourceKey::History(Ticker::new("AAPL"), TimePeriod::OneYear);
        let b = ResourceKey::History(Ticker::new("aapl"), TimePeriod::OneYear);
        let c = ResourceKey::History(Ticker::new("AAPL"), TimePeriod::TwoYears);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.kind(), ResourceKind::History);
        assert_eq!(a.ticker().as_str(), "AAPL");
    }

    #[test]
    fn test_key_display() {
        let key = ResourceKey::History(Ticker::new("AAPL"), TimePeriod::SixMonths);
        assert_eq!(key.to_string(), "history:AAPL:6mo");
        let key = ResourceKey::AiSummary(Ticker::new("MSFT"));
        assert_eq!(key.to_string(), "ai-summary:MSFT");
        let key = ResourceKey::Valuation(Ticker::new("MSFT"), ValuationParams::default());
        assert_eq!(key.to_string(), "valuation:MSFT:10-K:historical:1y:PEG");
    }
}
