use std::io;

use thiserror::Error;

/// Failure of a platform scan strategy.
///
/// Parse problems are not represented here: malformed lines in tool output
/// are skipped and a wholly unparsable output yields an empty network list.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan tool '{0}' not found")]
    ToolMissing(String),
    #[error("permission denied running '{0}'")]
    PermissionDenied(String),
    #[error("'{tool}' exited with status {status}: {stderr}")]
    CommandFailed {
        tool: String,
        status: i32,
        stderr: String,
    },
    #[error("'{tool}' timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },
    #[error("scan tool output is not valid UTF-8")]
    Output(#[from] std::string::FromUtf8Error),
    #[error("failed to run scan tool")]
    Spawn(#[from] io::Error),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    /// Anchor positions are collinear or duplicated, the circle system
    /// has no unique solution.
    #[error("degenerate anchor geometry")]
    DegenerateGeometry,
}
