// src/error.rs
use thiserror::Error;

/// Fatal conditions of a run. Anything recoverable (bad bytes, bad rows) is
/// logged where it happens and never becomes one of these.
#[derive(Debug, Error)]
pub enum RnaError {
    /// A catalog or archive endpoint answered with something other than 200.
    #[error("GET {url} returned status {status}")]
    RemoteFetch { url: String, status: u16 },

    /// Expected local data is absent (snapshot directory, region files, ...).
    #[error("missing data: {0}")]
    MissingData(String),
}
