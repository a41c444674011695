use std::path::PathBuf;
use thiserror::Error;

/// Fatal, per-operation failures. Recoverable per-item conditions — an
/// unreadable document source, a malformed snapshot line — are reported
/// through [`BuildReport`](crate::BuildReport) and
/// [`LoadReport`](crate::LoadReport) instead of aborting the operation.
#[derive(Error, Debug)]
pub enum Error {
    /// The snapshot destination or source could not be used.
    #[error("storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
