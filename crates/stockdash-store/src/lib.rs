#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/stockdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Resource state storage for the stock dashboard client.
//!
//! - [`ResourceStore`] - Keyed state machine with single-flight loading
//! - [`ResourceState`] - Status, data, error and generation of one key

/// Per-key resource state.
pub mod state;
/// The keyed resource store.
pub mod store;

pub use state::{ResourceState, Status};
pub use store::ResourceStore;
