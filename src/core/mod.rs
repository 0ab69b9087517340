// Core library modules
pub mod aggregate;
pub mod error;
pub mod events;
pub mod ie;
pub mod scan;
pub mod sink;
pub mod transport;
pub mod wext;

// Re-exports
pub use aggregate::{escape_essid, AccessPoint, Aggregator, ESSID_MAX_SIZE, MAX_RESULTS};
pub use error::ScanError;
pub use events::{EventTokenizer, ScanEvent};
pub use ie::{
    decode_security_element, format_information_elements, SecurityDescriptor, Suite, RSN_ID,
    WPA_VENDOR_ID,
};
pub use scan::{
    grown_capacity, run_cycle, DYNAMIC_BUFFER_VERSION, FIRST_WAIT_MICROS, INITIAL_BUFFER_LEN,
    MAX_BUFFER_LEN, MIN_SCAN_VERSION, RETRY_WAIT_MICROS, SCAN_BUDGET_MICROS,
};
pub use sink::{encode_results, write_results, ESSID_FIELD_LEN, RECORD_LEN};
pub use transport::{Capabilities, FetchError, RequestError, Transport};
pub use wext::{WextTokenizer, WextTransport};
