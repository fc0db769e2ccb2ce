//! Render models built from resource payloads.
//!
//! Every model is derived on read from the raw payload held by the store, and
//! every field that the payload may lack is optional. Nothing here fails: a
//! payload missing a field produces a model missing that field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockdash_core::series::{coerce_value, history_mapping, normalize, normalize_value};
use stockdash_core::{
    Block, DashError, NestedRecord, PathSpec, TimeSeries, ValuationStyle, parse_narrative, resolve,
};
use stockdash_store::{ResourceState, Status};

/// Text shown in the summary view when the service returned no narrative.
pub const SUMMARY_PLACEHOLDER: &str = "The AI-generated summary of this stock will appear here. \
The summary will provide insights about the company's performance, market position, and \
potential outlook.";

/// What a view can render for one resource.
#[derive(Clone, Debug, PartialEq)]
pub enum Readout<T> {
    /// Not requested yet.
    Idle,
    /// Request in flight.
    Loading,
    /// The request failed.
    Failed(DashError),
    /// Data is available.
    Ready(T),
}

impl<T> Readout<T> {
    /// Builds a readout from a store state, shaping loaded data with `shape`.
    pub fn from_state(state: &ResourceState, shape: impl FnOnce(&NestedRecord) -> T) -> Self {
        match (state.status, &state.data, &state.error) {
            (Status::Loading, ..) => Self::Loading,
            (Status::Failed, _, Some(error)) => Self::Failed(error.clone()),
            (Status::Loaded, Some(data), _) => Self::Ready(shape(data)),
            _ => Self::Idle,
        }
    }

    /// Returns true while the resource is loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the data if ready.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the readout, returning the data if ready.
    #[must_use]
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the error if the resource failed.
    #[must_use]
    pub const fn error(&self) -> Option<&DashError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Maps ready data, keeping every other state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Readout<U> {
        match self {
            Self::Idle => Readout::Idle,
            Self::Loading => Readout::Loading,
            Self::Failed(error) => Readout::Failed(error),
            Self::Ready(value) => Readout::Ready(f(value)),
        }
    }
}

fn at<'a>(record: &'a NestedRecord, keys: &[&str]) -> Option<&'a Value> {
    let path = PathSpec::new(keys.iter().copied()).ok()?;
    resolve(record, &path)
}

fn text_at(record: &NestedRecord, keys: &[&str]) -> Option<String> {
    at(record, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_at(record: &NestedRecord, keys: &[&str]) -> Option<f64> {
    at(record, keys).and_then(coerce_value)
}

/// Insider trading information, which the service sends either as prose or
/// as a transaction count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InsiderActivity {
    /// Descriptive text.
    Summary(String),
    /// Total number of transactions.
    Count(f64),
}

/// The description view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    /// Business description.
    pub description: Option<String>,
    /// Names the company used to trade under.
    pub former_names: Vec<String>,
    /// Description of the company's sector.
    pub sector_description: Option<String>,
    /// Sector name.
    pub sector: Option<String>,
    /// Insider trading information.
    pub insider_activity: Option<InsiderActivity>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Market value added.
    pub market_value_added: Option<f64>,
    /// Market-to-book ratio.
    pub market_to_book: Option<f64>,
}

impl CompanyOverview {
    /// Reads the overview out of a snapshot payload.
    #[must_use]
    pub fn from_record(record: &NestedRecord) -> Self {
        const INFO: &str = "Information";
        const MARKET: &str = "Market data";

        let former_names = at(record, &[INFO, "former names"])
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let insider_activity = match at(record, &[INFO, "insider transaction"]) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                Some(InsiderActivity::Summary(s.trim().to_string()))
            }
            Some(Value::Number(n)) => n.as_f64().map(InsiderActivity::Count),
            _ => None,
        };

        Self {
            description: text_at(record, &[INFO, "description"]),
            former_names,
            sector_description: text_at(record, &[INFO, "sector description"]),
            sector: text_at(record, &[INFO, "sector"]),
            insider_activity,
            market_cap: number_at(record, &[MARKET, "Market Cap"]),
            market_value_added: number_at(record, &[MARKET, "Market value added"]),
            market_to_book: number_at(record, &[MARKET, "Market to book"]),
        }
    }
}

/// Current price and daily change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Last price.
    pub price: Option<f64>,
    /// Absolute change, zero when unknown.
    pub change: f64,
    /// Percent change, zero when unknown.
    pub change_percent: f64,
}

impl Quote {
    /// Reads the quote from a payload's `Market data` group.
    #[must_use]
    pub fn from_record(record: &NestedRecord) -> Self {
        const MARKET: &str = "Market data";
        Self {
            price: number_at(record, &[MARKET, "Price"]),
            change: number_at(record, &[MARKET, "Price change"]).unwrap_or_default(),
            change_percent: number_at(record, &[MARKET, "Price change percent"])
                .unwrap_or_default(),
        }
    }

    /// Returns true unless the price went down.
    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.change >= 0.0
    }
}

/// Reads the closing-price series out of a history payload.
#[must_use]
pub fn price_history(record: &NestedRecord) -> TimeSeries {
    record
        .get("History")
        .map(|rows| normalize(&history_mapping(rows)))
        .unwrap_or_default()
}

/// Where a P/E ratio falls relative to historical norms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeBand {
    /// Below 15.
    Undervalued,
    /// 15 to 25 inclusive.
    FairlyValued,
    /// Above 25.
    Overvalued,
}

impl PeBand {
    /// Classifies a P/E ratio.
    #[must_use]
    pub fn from_pe(pe: f64) -> Self {
        if pe < 15.0 {
            Self::Undervalued
        } else if pe <= 25.0 {
            Self::FairlyValued
        } else {
            Self::Overvalued
        }
    }

    /// Short heading for the band.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::Undervalued => "Low P/E (Below 15)",
            Self::FairlyValued => "Average P/E (15-25)",
            Self::Overvalued => "High P/E (Above 25)",
        }
    }
}

/// The valuation view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    /// Which ratio the service computed.
    pub style: ValuationStyle,
    /// PEG or PEGY ratio.
    pub ratio: Option<f64>,
    /// Price to earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Band of `pe_ratio`.
    pub pe_band: Option<PeBand>,
    /// Growth rate the ratio was computed with.
    pub growth_rate: Option<f64>,
    /// Earnings history behind the growth rate.
    pub earnings: TimeSeries,
}

impl ValuationSummary {
    /// Reads the summary out of a valuation payload.
    ///
    /// The payload's `Analysis of stock.Type` flag decides the ratio style;
    /// `requested` is used when the flag is missing.
    #[must_use]
    pub fn from_record(record: &NestedRecord, requested: ValuationStyle) -> Self {
        const ANALYSIS: &str = "Analysis of stock";
        const GROWTH: &str = "Growth data";

        let style = match at(record, &[ANALYSIS, "Type"]).and_then(Value::as_bool) {
            Some(false) => ValuationStyle::Peg,
            Some(true) => ValuationStyle::Pegy,
            None => requested,
        };
        let ratio = match style {
            ValuationStyle::Peg => number_at(record, &[ANALYSIS, "Price / Earnings to growth"]),
            ValuationStyle::Pegy => number_at(
                record,
                &[ANALYSIS, "Price / Earnings to Growth and Dividend yield"],
            ),
        };
        let pe_ratio = number_at(record, &[GROWTH, "Price to Equity"]);

        // Older service builds spell the earnings path with underscores.
        let earnings = at(record, &[GROWTH, "Growth rate data", "earnings data"])
            .or_else(|| at(record, &["Growth_data", "Growth_rate_data", "earnings_data"]))
            .map(normalize_value)
            .unwrap_or_default();

        Self {
            style,
            ratio,
            pe_ratio,
            pe_band: pe_ratio.map(PeBand::from_pe),
            growth_rate: number_at(record, &[GROWTH, "Growth rate data", "growth rate"]),
            earnings,
        }
    }

    /// Returns whether the ratio is at or below 1, the usual threshold for a
    /// fairly priced growth stock.
    #[must_use]
    pub fn ratio_is_favorable(&self) -> Option<bool> {
        self.ratio.map(|r| r <= 1.0)
    }
}

/// Parses the narrative of an AI summary payload.
///
/// A missing or blank narrative yields [`SUMMARY_PLACEHOLDER`].
#[must_use]
pub fn summary_blocks(record: &NestedRecord) -> Vec<Block> {
    let text = record
        .get("LLM analysis")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(SUMMARY_PLACEHOLDER);
    parse_narrative(text)
}

/// Formats a dollar amount compactly: `$2.95T`, `$310.40B`, `$12.00M`.
///
/// Amounts below a million are written in full with thousands separators.
/// Missing and zero amounts give `N/A`.
#[must_use]
pub fn format_compact_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| *v != 0.0 && v.is_finite()) else {
        return "N/A".to_string();
    };
    if v >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else {
        format!("${}", group_thousands(v))
    }
}

fn group_thousands(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let frac = frac.trim_end_matches('0');
    let sign = if v < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockdash_core::Inline;

    #[test]
    fn test_readout_from_state() {
        let mut state = ResourceState::default();
        assert_eq!(Readout::from_state(&state, Clone::clone), Readout::Idle);

        state.status = Status::Loading;
        state.data = Some(json!({"kept": true}));
        assert!(Readout::from_state(&state, Clone::clone).is_loading());

        state.status = Status::Loaded;
        let ready = Readout::from_state(&state, |d| d["kept"].as_bool());
        assert_eq!(ready.ready(), Some(&Some(true)));

        state.status = Status::Failed;
        state.error = Some(DashError::Backend("boom".into()));
        let failed = Readout::from_state(&state, Clone::clone);
        assert_eq!(failed.error(), Some(&DashError::Backend("boom".into())));
        assert!(failed.map(|_| 1).into_ready().is_none());
    }

    #[test]
    fn test_company_overview() {
        let record = json!({
            "Information": {
                "description": "Designs consumer electronics.",
                "former names": [{"name": "Apple Computer Inc"}, {"date": "1977"}],
                "sector": "Technology",
                "sector description": "   ",
                "insider transaction": 42
            },
            "Market data": {"Market Cap": 2.95e12, "Market to book": "48.3", "Market value added": null}
        });
        let overview = CompanyOverview::from_record(&record);
        assert_eq!(overview.description.as_deref(), Some("Designs consumer electronics."));
        assert_eq!(overview.former_names, vec!["Apple Computer Inc"]);
        assert_eq!(overview.sector.as_deref(), Some("Technology"));
        assert!(overview.sector_description.is_none());
        assert_eq!(overview.insider_activity, Some(InsiderActivity::Count(42.0)));
        assert_eq!(overview.market_cap, Some(2.95e12));
        assert_eq!(overview.market_to_book, Some(48.3));
        assert!(overview.market_value_added.is_none());
    }

    #[test]
    fn test_overview_of_empty_payload() {
        assert_eq!(CompanyOverview::from_record(&json!({})), CompanyOverview::default());
        assert_eq!(CompanyOverview::from_record(&json!({"Information": "n/a"})), CompanyOverview::default());
    }

    #[test]
    fn test_quote() {
        let quote = Quote::from_record(&json!({"Market data": {
            "Price": 189.25, "Price change": "-1.10", "Price change percent": -0.58
        }}));
        assert_eq!(quote.price, Some(189.25));
        assert_eq!(quote.change, -1.10);
        assert!(!quote.is_gain());

        let empty = Quote::from_record(&json!({}));
        assert!(empty.price.is_none());
        assert!(empty.is_gain());
    }

    #[test]
    fn test_price_history() {
        let series = price_history(&json!({"History": [
            {"Date": "Tue, 02 Jan 2024 00:00:00 GMT", "Close": 185.64},
            {"Date": "Mon, 01 Jan 2024 00:00:00 GMT", "Close": 184.0},
            {"Date": "Wed, 03 Jan 2024 00:00:00 GMT"}
        ]}));
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().map(|p| p.value), Some(184.0));
        assert!(price_history(&json!({})).is_empty());
    }

    #[test]
    fn test_pe_bands() {
        assert_eq!(PeBand::from_pe(14.99), PeBand::Undervalued);
        assert_eq!(PeBand::from_pe(15.0), PeBand::FairlyValued);
        assert_eq!(PeBand::from_pe(25.0), PeBand::FairlyValued);
        assert_eq!(PeBand::from_pe(25.01), PeBand::Overvalued);
        assert_eq!(PeBand::Overvalued.headline(), "High P/E (Above 25)");
    }

    #[test]
    fn test_valuation_summary() {
        let record = json!({
            "Analysis of stock": {
                "Type": true,
                "Price / Earnings to growth": 2.1,
                "Price / Earnings to Growth and Dividend yield": 0.85
            },
            "Growth data": {
                "Price to Equity": "31.2",
                "Growth rate data": {
                    "growth rate": 0.12,
                    "earnings data": {"2023-09-30": 6.13, "2022-09-30": 6.11}
                }
            }
        });
        let summary = ValuationSummary::from_record(&record, ValuationStyle::Peg);
        assert_eq!(summary.style, ValuationStyle::Pegy);
        assert_eq!(summary.ratio, Some(0.85));
        assert_eq!(summary.ratio_is_favorable(), Some(true));
        assert_eq!(summary.pe_ratio, Some(31.2));
        assert_eq!(summary.pe_band, Some(PeBand::Overvalued));
        assert_eq!(summary.growth_rate, Some(0.12));
        assert_eq!(summary.earnings.len(), 2);
    }

    #[test]
    fn test_valuation_falls_back_to_requested_style() {
        let record = json!({"Analysis of stock": {"Price / Earnings to growth": 1.4}});
        let summary = ValuationSummary::from_record(&record, ValuationStyle::Peg);
        assert_eq!(summary.style, ValuationStyle::Peg);
        assert_eq!(summary.ratio, Some(1.4));
        assert!(summary.pe_band.is_none());
        assert!(summary.earnings.is_empty());
    }

    #[test]
    fn test_summary_blocks() {
        let blocks = summary_blocks(&json!({"LLM analysis": "**Verdict:** hold"}));
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                Inline::Emphasis("Verdict:".into()),
                Inline::Text(" hold".into())
            ])]
        );

        let placeholder = summary_blocks(&json!({"LLM analysis": "  "}));
        assert_eq!(placeholder, parse_narrative(SUMMARY_PLACEHOLDER));
    }

    #[test]
    fn test_format_compact_currency() {
        assert_eq!(format_compact_currency(Some(2.95e12)), "$2.95T");
        assert_eq!(format_compact_currency(Some(310.4e9)), "$310.40B");
        assert_eq!(format_compact_currency(Some(12e6)), "$12.00M");
        assert_eq!(format_compact_currency(Some(48.3)), "$48.3");
        assert_eq!(format_compact_currency(Some(123_456.0)), "$123,456");
        assert_eq!(format_compact_currency(Some(-5_000.5)), "$-5,000.5");
        assert_eq!(format_compact_currency(Some(0.0)), "N/A");
        assert_eq!(format_compact_currency(None), "N/A");
    }
}
