#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/stockdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the stock dashboard client.
//!
//! This crate provides the data-shaping layer that sits between raw provider
//! payloads and render-ready views:
//!
//! - [`resolve`](record::resolve) - Never-failing key-path lookup
//! - [`normalize`](series::normalize) - Date-keyed mapping to [`TimeSeries`]
//! - [`assemble`](section::assemble) - Section tables to ordered chart groups
//! - [`parse_narrative`](narrative::parse_narrative) - AI narrative markup
//! - [`ResourceFetcher`](fetcher::ResourceFetcher) - Async data-source seam

/// Error types for fetch failures and parameter parsing.
pub mod error;
/// The async fetcher trait.
pub mod fetcher;
/// Narrative text formatter.
pub mod narrative;
/// Request parameter definitions.
pub mod params;
/// Key-path resolution and record merging.
pub mod record;
/// Declarative section tables and assembly.
pub mod section;
/// Time series normalization.
pub mod series;
/// Resource identity types (Ticker, ResourceKey, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DashError, ErrorKind, ParseParamError, Result};
pub use fetcher::ResourceFetcher;
pub use narrative::{Block, Inline, parse_narrative};
pub use params::{FilingType, GrowthType, TimePeriod, ValuationParams, ValuationStyle};
pub use record::{NestedRecord, PathSpec, merge_records, resolve};
pub use section::{AssembledSection, SectionDefinition, SectionEntry, assemble, visible_sections};
pub use series::{SeriesPoint, TimeSeries, normalize};
pub use types::{ResourceKey, ResourceKind, Ticker};
