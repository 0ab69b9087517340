/*!
 * Transport boundary for scan acquisition
 *
 * The acquisition loop only sees this trait; the real implementation talks
 * wireless-extensions ioctls, the test suites substitute mocks.
 */

use std::io;

/// Interface metadata relevant to scanning.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub supports_scan: bool,
    /// Wireless-extensions version the driver was compiled against. Governs
    /// both the event-stream layout and whether the result buffer may be
    /// grown on demand.
    pub protocol_version: u8,
}

/// Outcome of a scan-start request.
#[derive(Debug)]
pub enum RequestError {
    /// Not fatal: the caller falls back to whatever results the driver has
    /// cached, with no wait.
    PermissionDenied,
    Io(io::Error),
}

/// Outcome of a result fetch.
#[derive(Debug)]
pub enum FetchError {
    /// The driver has more data than the offered buffer holds. `hint` is the
    /// driver-reported total length, 0 when it gave none.
    BufferTooSmall { hint: usize },
    /// The scan is still running; poll again later.
    NotReady,
    Io(io::Error),
}

/// A scan-capable network interface.
pub trait Transport {
    /// Query capability metadata. `None` when the interface reports no range
    /// information at all.
    fn capabilities(&self) -> Option<Capabilities>;

    /// Ask the driver to start a fresh scan.
    fn request_scan(&self) -> Result<(), RequestError>;

    /// Copy available scan results into `buffer`, returning the number of
    /// bytes written.
    fn fetch_results(&self, buffer: &mut [u8]) -> Result<usize, FetchError>;
}
