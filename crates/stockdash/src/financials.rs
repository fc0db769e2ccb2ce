//! Built-in section tables for the financials view.
//!
//! The snapshot payload carries three ratio groups, `Cyclical data`,
//! `Liquidity data` and `Profit data`. Each leaf named here is a date-keyed
//! mapping of one ratio over the reporting history.

use stockdash_core::{PathSpec, SectionDefinition};

/// Builds a section from `(label, path)` rows.
fn table(title: &str, rows: &[(&str, &[&str])]) -> SectionDefinition {
    rows.iter().fold(SectionDefinition::new(title), |def, (label, keys)| {
        match PathSpec::new(keys.iter().copied()) {
            Ok(path) => def.with_entry(*label, path),
            Err(_) => def,
        }
    })
}

/// Working capital cycle ratios.
#[must_use]
pub fn cyclical_section() -> SectionDefinition {
    const CYCLE: &str = "Cyclical data";
    const CASH: &str = "Cash Cycle data";
    const OPERATING: &str = "Operating Cycle data";
    const PAYABLE: &str = "Account payable data";
    const WORK: &str = "operating work";

    table(
        "Cyclical Analysis",
        &[
            ("Cash Conversion Cycle", &[CYCLE, CASH, "Cash conversion cycle"]),
            ("Operating Cycle", &[CYCLE, OPERATING, "operating cycle"]),
            ("Accounts Payable", &[CYCLE, CASH, PAYABLE, "Accounts Payable period"]),
            ("Average Days to Pay", &[CYCLE, CASH, PAYABLE, "Average days to pay"]),
            (
                "Asset Turnover",
                &[CYCLE, OPERATING, WORK, "asset turnover data", "Inventory turnover"],
            ),
            (
                "Average Days in Inventory",
                &[CYCLE, OPERATING, WORK, "asset turnover data", "Average days in inventory"],
            ),
            (
                "Receivable Turnover",
                &[CYCLE, OPERATING, WORK, "receivable turnover data", "Receivable turnover"],
            ),
            (
                "Average Collection Period",
                &[CYCLE, OPERATING, WORK, "receivable turnover data", "Average collection period"],
            ),
        ],
    )
}

/// Short-term solvency and leverage ratios.
#[must_use]
pub fn liquidity_section() -> SectionDefinition {
    const LIQUIDITY: &str = "Liquidity data";
    const NWC: &str = "Net working capital ratio data";
    const DEBT: &str = "Debt ratio data";

    table(
        "Liquidity Analysis",
        &[
            ("Current Ratio", &[LIQUIDITY, "Current ratio data"]),
            ("Quick Ratio", &[LIQUIDITY, "Quick ratio data", "Quick Ratio"]),
            ("Net Working Capital", &[LIQUIDITY, NWC, "Net working Capital"]),
            ("Net Working Capital to Assets", &[LIQUIDITY, NWC, "Net working capital to Assets"]),
            (
                "Times Interest Earned",
                &[LIQUIDITY, "Times interest earned data", "Times Interest Earned"],
            ),
            ("Total Debt Ratio", &[LIQUIDITY, "Total debt data", "Total debt"]),
            ("Long Term Debt Ratio", &[LIQUIDITY, DEBT, "Long term debt ratio"]),
            ("Long Term Debt-Equity Ratio", &[LIQUIDITY, DEBT, "Long term debt-equity ratio"]),
        ],
    )
}

/// Margin, return and growth ratios.
#[must_use]
pub fn profitability_section() -> SectionDefinition {
    const PROFIT: &str = "Profit data";
    const MARGIN: &str = "Profit Margin data";
    const GROWTH: &str = "Growth Rate data";

    table(
        "Profitability Analysis",
        &[
            ("Profit Margin", &[PROFIT, MARGIN, "Profit margin"]),
            ("Operating Profit Margin", &[PROFIT, MARGIN, "Operating profit margin"]),
            ("Return on Assets", &[PROFIT, "Return on Asset data", "Return on Asset"]),
            ("Return on Equity", &[PROFIT, "Return on Equity data", "Return on Equity"]),
            ("Return on Capital", &[PROFIT, "Return on Capital data", "Return on Capital"]),
            ("Internal Growth Rate", &[PROFIT, GROWTH, "Internal Growth Rate"]),
            ("Sustainable Growth Rate", &[PROFIT, GROWTH, "Sustainable Growth Rate"]),
        ],
    )
}

/// All financial sections in display order.
#[must_use]
pub fn financial_sections() -> Vec<SectionDefinition> {
    vec![cyclical_section(), liquidity_section(), profitability_section()]
}
