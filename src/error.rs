//! Error types surfaced to callers of the core.

use thiserror::Error;

/// Failures a caller can act on.
///
/// A restoration skip (the position is occupied or now protected) is an
/// expected terminal outcome of processing a record, not an error, and
/// never appears here. There is no retry policy anywhere: a record is
/// attempted exactly once at eligibility time, and a save is attempted
/// exactly once per trigger.
#[derive(Debug, Error)]
pub enum RegenError {
    /// The owner already holds the maximum number of build areas.
    #[error("build area quota reached ({max} per player)")]
    QuotaExceeded { max: u32 },

    /// The referenced area no longer exists (stale handle).
    #[error("no such area")]
    NotFound,

    /// Saving or loading the data file failed. A failed load degrades to
    /// empty state rather than refusing to start.
    #[error("persistence: {0}")]
    Persistence(String),
}
