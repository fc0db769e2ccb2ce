//! State of a single resource key.

use stockdash_core::{DashError, ErrorKind, NestedRecord};

/// Lifecycle status of a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Nothing fetched for the current generation.
    #[default]
    Idle,
    /// A fetch for the current generation is in flight.
    Loading,
    /// The last fetch succeeded.
    Loaded,
    /// The last fetch failed.
    Failed,
}

/// Everything the store knows about one resource key.
///
/// `generation` increases whenever the key is invalidated or a forced refresh
/// starts. A response is only applied if the generation it was requested
/// under is still current.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceState {
    /// Lifecycle status.
    pub status: Status,
    /// Last successfully fetched payload.
    pub data: Option<NestedRecord>,
    /// Error of the last failed fetch.
    pub error: Option<DashError>,
    /// Staleness counter.
    pub generation: u64,
}

impl ResourceState {
    /// Returns true while a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    /// Returns true once the current generation has a result, good or bad.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self.status, Status::Loaded | Status::Failed)
    }

    /// Returns the category of the recorded error, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(DashError::kind)
    }
}
