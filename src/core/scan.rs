/*!
 * Scan acquisition
 *
 * Drives one scan cycle against a transport: capability check, scan-start
 * request, a timed poll loop with a fixed time budget and an adaptively
 * grown result buffer, then tokenization and aggregation.
 */

use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::core::aggregate::{AccessPoint, Aggregator};
use crate::core::error::ScanError;
use crate::core::events::EventTokenizer;
use crate::core::transport::{FetchError, RequestError, Transport};

/// Total time budget for one scan cycle, in microseconds.
pub const SCAN_BUDGET_MICROS: u64 = 1_000_000;
/// Wait between issuing the scan request and the first fetch attempt.
pub const FIRST_WAIT_MICROS: u64 = 250;
/// Budget quantum consumed (and wait scheduled) per not-ready retry.
pub const RETRY_WAIT_MICROS: u64 = 100_000;

/// Initial result buffer capacity; the pre-WE-17 fixed maximum.
pub const INITIAL_BUFFER_LEN: usize = 4096;
/// The driver reports result length in 16 bits, so growth caps here.
pub const MAX_BUFFER_LEN: usize = 0xFFFF;

/// Oldest wireless-extensions version with scan support.
pub const MIN_SCAN_VERSION: u8 = 14;
/// Versions above this accept result buffers larger than the fixed minimum.
pub const DYNAMIC_BUFFER_VERSION: u8 = 16;

/// Next buffer capacity after the driver rejected `current` as too small.
/// Strictly increasing below the cap, so repeated growth terminates.
pub fn grown_capacity(current: usize, hint: usize) -> usize {
    hint.max(current * 2).min(MAX_BUFFER_LEN)
}

/// Mutable state of one polling loop: remaining time budget and the wait
/// scheduled before the next fetch attempt.
#[derive(Debug)]
struct ScanBudget {
    remaining_micros: i64,
    next_wait_micros: u64,
}

impl ScanBudget {
    /// `first_wait` is 0 on the permission-denied fallback path, otherwise
    /// [`FIRST_WAIT_MICROS`]; either way it is charged against the budget
    /// up front.
    fn new(first_wait: u64) -> Self {
        Self {
            remaining_micros: SCAN_BUDGET_MICROS as i64 - first_wait as i64,
            next_wait_micros: first_wait,
        }
    }

    /// Sleep out the scheduled wait before the next fetch attempt.
    fn wait(&self) {
        if self.next_wait_micros > 0 {
            thread::sleep(Duration::from_micros(self.next_wait_micros));
        }
    }

    /// Charge one not-ready retry. Returns false once the budget is spent.
    fn consume_retry(&mut self) -> bool {
        self.remaining_micros -= RETRY_WAIT_MICROS as i64;
        self.next_wait_micros = RETRY_WAIT_MICROS;
        self.remaining_micros > 0
    }
}

/// Run one complete scan cycle and return the aggregated access points.
///
/// An exhausted budget and a zero-length result are both reported as an
/// empty, successful result set; only capability, transport and allocation
/// failures are errors.
pub fn run_cycle<T, K>(transport: &T, tokenizer: &K) -> Result<Vec<AccessPoint>, ScanError>
where
    T: Transport,
    K: EventTokenizer,
{
    let caps = transport
        .capabilities()
        .ok_or_else(|| ScanError::Capability("no range information".to_string()))?;
    if !caps.supports_scan || caps.protocol_version < MIN_SCAN_VERSION {
        return Err(ScanError::Capability(format!(
            "wireless extensions v{} predates scanning",
            caps.protocol_version
        )));
    }

    let mut budget = match transport.request_scan() {
        Ok(()) => ScanBudget::new(FIRST_WAIT_MICROS),
        Err(RequestError::PermissionDenied) => {
            // Unprivileged: read whatever the driver already has, no wait.
            debug!("scan request denied, falling back to cached results");
            ScanBudget::new(0)
        }
        Err(RequestError::Io(err)) => return Err(ScanError::Transport(err)),
    };

    let mut buffer = Vec::new();
    grow_buffer(&mut buffer, INITIAL_BUFFER_LEN)?;

    let length = loop {
        budget.wait();

        match transport.fetch_results(&mut buffer) {
            // A lying driver length must never index past the buffer.
            Ok(length) => break length.min(buffer.len()),
            Err(FetchError::BufferTooSmall { hint })
                if caps.protocol_version > DYNAMIC_BUFFER_VERSION
                    && buffer.len() < MAX_BUFFER_LEN =>
            {
                let next = grown_capacity(buffer.len(), hint);
                debug!("result buffer too small, growing {} -> {}", buffer.len(), next);
                grow_buffer(&mut buffer, next)?;
                // Retry immediately, the data is already there.
                budget.next_wait_micros = 0;
            }
            Err(FetchError::BufferTooSmall { .. }) => {
                // Cannot grow any further (or the driver predates dynamic
                // sizing); treat like any other fetch failure.
                return Err(ScanError::Transport(std::io::Error::from_raw_os_error(
                    libc::E2BIG,
                )));
            }
            Err(FetchError::NotReady) => {
                if !budget.consume_retry() {
                    info!("scan budget exhausted, no results");
                    break 0;
                }
            }
            Err(FetchError::Io(err)) => return Err(ScanError::Transport(err)),
        }
    };

    let mut aggregator = Aggregator::new();
    if length > 0 {
        for event in tokenizer.tokenize(&buffer[..length], caps.protocol_version) {
            aggregator.push(event);
            if aggregator.is_full() {
                // Later events would be dropped anyway.
                break;
            }
        }
    } else {
        info!("no scan results");
    }

    Ok(aggregator.finish())
}

/// Resize the result buffer, surfacing allocation failure instead of
/// aborting the process.
fn grow_buffer(buffer: &mut Vec<u8>, capacity: usize) -> Result<(), ScanError> {
    buffer.try_reserve_exact(capacity.saturating_sub(buffer.len()))?;
    buffer.resize(capacity, 0);
    Ok(())
}
