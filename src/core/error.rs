/*!
 * Error taxonomy for a scan cycle
 *
 * Only the terminal failure categories live here. Permission-denied scan
 * requests, not-ready polls, buffer growth and truncated security elements
 * are all recovered locally and never surface as errors.
 */

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Terminal failures of a scan cycle, one variant per process exit category.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The interface reports no range metadata, or a wireless-extensions
    /// protocol version too old to support scanning.
    #[error("interface doesn't support scanning: {0}")]
    Capability(String),

    /// An ioctl-level failure other than the handled EPERM/E2BIG/EAGAIN cases.
    #[error("failed to read scan data: {0}")]
    Transport(#[from] io::Error),

    /// The scan result buffer could not be grown to the requested capacity.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// The output FIFO could not be created, opened or written.
    #[error("output channel error: {0}")]
    Channel(io::Error),
}

impl ScanError {
    /// Process exit code for this failure category. 0 is reserved for
    /// success (including an empty result set).
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::Capability(_) => 2,
            ScanError::Transport(_) => 3,
            ScanError::Allocation(_) => 4,
            ScanError::Channel(_) => 5,
        }
    }
}
