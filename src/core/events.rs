/*!
 * Typed scan-event vocabulary
 *
 * A scan result buffer is tokenized into a flat sequence of these events
 * by a transport-specific tokenizer. The aggregator only interprets the
 * three record-building kinds; everything else arrives as `Other(code)`.
 */

/// One typed token extracted from a scan result stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Cell boundary: the hardware address of a newly reported access point.
    Address([u8; 6]),
    /// ESSID of the current cell. `bytes` is the raw driver payload;
    /// `present` is false when the driver reports the ESSID as unset.
    Essid { bytes: Vec<u8>, present: bool },
    /// Link quality of the current cell.
    Quality(i8),
    /// Any event kind this tool does not build records from.
    Other(u16),
}

/// Splits a raw scan result buffer into typed events.
///
/// The stream is finite and consumed once per scan cycle. `protocol_version`
/// is the wireless-extensions version the driver was compiled against; the
/// on-wire event layout depends on it.
pub trait EventTokenizer {
    fn tokenize(&self, buffer: &[u8], protocol_version: u8) -> Vec<ScanEvent>;
}

// Wireless-extensions command codes (linux/wireless.h). The first three are
// the record-building kinds; the rest are legitimate scan tokens this tool
// deliberately ignores.
pub const SIOCGIWAP: u16 = 0x8B15;
pub const SIOCGIWESSID: u16 = 0x8B1B;
pub const IWEVQUAL: u16 = 0x8C01;

pub const SIOCGIWNAME: u16 = 0x8B01;
pub const SIOCGIWNWID: u16 = 0x8B03;
pub const SIOCGIWFREQ: u16 = 0x8B05;
pub const SIOCGIWMODE: u16 = 0x8B07;
pub const SIOCGIWRATE: u16 = 0x8B21;
pub const SIOCGIWENCODE: u16 = 0x8B2B;
pub const SIOCGIWMODUL: u16 = 0x8B2F;
pub const IWEVCUSTOM: u16 = 0x8C02;
pub const IWEVGENIE: u16 = 0x8C05;

/// Event kinds that are part of the protocol but carry nothing this tool
/// records. Codes outside this list (and the record-building three) are
/// reported as unknown tokens.
pub const KNOWN_IGNORED: [u16; 9] = [
    SIOCGIWNAME,
    SIOCGIWNWID,
    SIOCGIWFREQ,
    SIOCGIWMODE,
    SIOCGIWRATE,
    SIOCGIWENCODE,
    SIOCGIWMODUL,
    IWEVCUSTOM,
    IWEVGENIE,
];
