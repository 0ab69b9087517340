/*!
 * iwscan
 *
 * Scans a wireless interface through the Linux wireless-extensions ioctls,
 * aggregates per-station records from the driver's event stream, decodes
 * embedded WPA/RSN security elements for display, and streams the finished
 * result set to a consumer process over a named pipe.
 *
 * The acquisition loop, aggregation and element decoding are all usable
 * against mock collaborators; only [`core::wext`] and [`core::sink`] touch
 * the operating system.
 */

pub mod core;

pub use crate::core::{
    decode_security_element, encode_results, escape_essid, format_information_elements,
    run_cycle, write_results, AccessPoint, Aggregator, Capabilities, EventTokenizer, FetchError,
    RequestError, ScanError, ScanEvent, SecurityDescriptor, Suite, Transport, WextTokenizer,
    WextTransport, ESSID_FIELD_LEN, ESSID_MAX_SIZE, MAX_RESULTS, RECORD_LEN,
};
