//! Unit data access trait abstraction.

use gridbot_core::parse_timestamp;

/// Error type for data source construction.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building a data source.
///
/// Lookups themselves never fail; missing or mistyped fields resolve to the
/// caller's default.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only access to a unit's assignment and request metadata.
///
/// Fields are addressed by dotted paths into nested mappings, e.g.
/// `assignment.timeout` or `request.time`. This trait keeps the metrics
/// code decoupled from the concrete snapshot representation the network
/// layer hands the agent.
pub trait UnitData: Send + Sync {
    /// Unsigned integer at `path`, or `None` if missing or not readable as
    /// an unsigned integer.
    fn optional_u64(&self, path: &str) -> Option<u64>;

    /// String at `path`, or `None` if missing or not a string.
    fn optional_str(&self, path: &str) -> Option<&str>;

    /// Unsigned integer at `path`, falling back to `default`.
    fn u64_or(&self, path: &str, default: u64) -> u64 {
        self.optional_u64(path).unwrap_or(default)
    }

    /// Timestamp string at `path` as seconds since the Unix epoch.
    ///
    /// Resolves to 0 when the field is missing or unparseable.
    fn timestamp(&self, path: &str) -> u64 {
        self.optional_str(path)
            .and_then(parse_timestamp)
            .unwrap_or(0)
    }
}
