#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/stockdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Data layer for a stock analysis dashboard.
//!
//! This crate re-exports the core types, the resource store and, with the
//! `http` feature, the HTTP fetcher. On top of those it provides the
//! [`ViewOrchestrator`], which decides when each view's data is fetched, and
//! the render models the views read.
//!
//! # Features
//!
//! - `http` - HTTP fetcher for the analysis service (default)
//! - `polars` - DataFrame export of time series

// Core types and traits
pub use stockdash_core::*;

// Resource store
pub use stockdash_store::{ResourceState, ResourceStore, Status};

// HTTP fetcher
#[cfg(feature = "http")]
pub use stockdash_client::{ClientConfig, HttpFetcher};

/// Built-in section tables for the financials view.
pub mod financials;
mod orchestrator;
/// Render models built from resource payloads.
pub mod views;

pub use financials::{
    cyclical_section, financial_sections, liquidity_section, profitability_section,
};
pub use orchestrator::{View, ViewOrchestrator, ViewParams, required_keys};
pub use views::{
    CompanyOverview, InsiderActivity, PeBand, Quote, Readout, SUMMARY_PLACEHOLDER,
    ValuationSummary, format_compact_currency,
};
