/*!
 * Scan result aggregation
 *
 * Reduces the flat event sequence produced by a tokenizer into an ordered,
 * capacity-bounded list of access-point records. Address events open a new
 * record and move an explicit cursor; essid and quality events mutate the
 * record under the cursor; everything else is ignored.
 */

use log::warn;

use crate::core::events::{ScanEvent, KNOWN_IGNORED};

/// Hard cap on the number of access points kept per scan cycle.
pub const MAX_RESULTS: usize = 32;

/// Maximum raw ESSID length accepted from the driver, in bytes.
pub const ESSID_MAX_SIZE: usize = 32;

/// One discovered access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub bssid: [u8; 6],
    /// Escaped display string; non-printable bytes appear as `\xHH`.
    pub essid: String,
    pub strength: i8,
}

impl AccessPoint {
    fn new(bssid: [u8; 6]) -> Self {
        Self {
            bssid,
            essid: String::new(),
            strength: 0,
        }
    }

    /// BSSID as 12 uppercase hex characters, no separators.
    pub fn bssid_hex(&self) -> String {
        let mut out = String::with_capacity(12);
        for octet in &self.bssid {
            out.push_str(&format!("{:02X}", octet));
        }
        out
    }
}

/// Escape a raw ESSID for display: printable ASCII passes through, while
/// backslash and anything non-printable become `\xHH`. Input is clamped to
/// [`ESSID_MAX_SIZE`] bytes.
pub fn escape_essid(raw: &[u8]) -> String {
    let raw = &raw[..raw.len().min(ESSID_MAX_SIZE)];
    let mut out = String::with_capacity(raw.len());
    for &b in raw {
        if (0x20..0x7f).contains(&b) && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02X}", b));
        }
    }
    out
}

/// Event reducer building the per-cycle result set.
///
/// The cursor always points at the most recently appended record. Only
/// address events move it; a malformed stream that leads with essid or
/// quality events simply has those events dropped.
#[derive(Debug, Default)]
pub struct Aggregator {
    aps: Vec<AccessPoint>,
    cursor: Option<usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the result set holds [`MAX_RESULTS`] records. Further
    /// address events are dropped, so feeding can stop early.
    pub fn is_full(&self) -> bool {
        self.aps.len() >= MAX_RESULTS
    }

    pub fn len(&self) -> usize {
        self.aps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aps.is_empty()
    }

    /// Fold one event into the result set.
    pub fn push(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::Address(bssid) => {
                if self.is_full() {
                    return;
                }
                self.aps.push(AccessPoint::new(bssid));
                self.cursor = Some(self.aps.len() - 1);
            }
            ScanEvent::Essid { bytes, present } => {
                if let Some(ap) = self.cursor.and_then(|i| self.aps.get_mut(i)) {
                    ap.essid = if present {
                        escape_essid(&bytes)
                    } else {
                        String::new()
                    };
                }
            }
            ScanEvent::Quality(value) => {
                if let Some(ap) = self.cursor.and_then(|i| self.aps.get_mut(i)) {
                    ap.strength = value;
                }
            }
            ScanEvent::Other(code) => {
                if !KNOWN_IGNORED.contains(&code) {
                    warn!("(unknown wireless token 0x{:04X})", code);
                }
            }
        }
    }

    /// Hand the finished record set to the caller, discovery order preserved.
    pub fn finish(self) -> Vec<AccessPoint> {
        self.aps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> ScanEvent {
        ScanEvent::Address([0x00, 0x11, 0x22, 0x33, 0x44, last])
    }

    // =========================================================================
    // Record creation and ordering
    // =========================================================================

    #[test]
    fn test_address_events_append_in_discovery_order() {
        let mut agg = Aggregator::new();
        for i in 0..5 {
            agg.push(addr(i));
        }
        let aps = agg.finish();
        assert_eq!(aps.len(), 5);
        for (i, ap) in aps.iter().enumerate() {
            assert_eq!(ap.bssid[5], i as u8);
            assert_eq!(ap.essid, "");
            assert_eq!(ap.strength, 0);
        }
    }

    #[test]
    fn test_result_set_caps_at_max_results() {
        let mut agg = Aggregator::new();
        for i in 0..40 {
            agg.push(addr(i));
        }
        assert!(agg.is_full());
        let aps = agg.finish();
        assert_eq!(aps.len(), MAX_RESULTS);
        assert_eq!(aps.last().unwrap().bssid[5], (MAX_RESULTS - 1) as u8);
    }

    // =========================================================================
    // Cursor semantics
    // =========================================================================

    #[test]
    fn test_essid_and_quality_update_latest_record_only() {
        let mut agg = Aggregator::new();
        agg.push(addr(0));
        agg.push(ScanEvent::Essid {
            bytes: b"first".to_vec(),
            present: true,
        });
        agg.push(addr(1));
        agg.push(ScanEvent::Essid {
            bytes: b"second".to_vec(),
            present: true,
        });
        agg.push(ScanEvent::Quality(-42));

        let aps = agg.finish();
        assert_eq!(aps[0].essid, "first");
        assert_eq!(aps[0].strength, 0);
        assert_eq!(aps[1].essid, "second");
        assert_eq!(aps[1].strength, -42);
    }

    #[test]
    fn test_events_before_first_address_are_dropped() {
        let mut agg = Aggregator::new();
        agg.push(ScanEvent::Essid {
            bytes: b"orphan".to_vec(),
            present: true,
        });
        agg.push(ScanEvent::Quality(7));
        assert!(agg.is_empty());

        agg.push(addr(0));
        let aps = agg.finish();
        assert_eq!(aps[0].essid, "");
        assert_eq!(aps[0].strength, 0);
    }

    #[test]
    fn test_absent_essid_flag_clears_the_field() {
        let mut agg = Aggregator::new();
        agg.push(addr(0));
        agg.push(ScanEvent::Essid {
            bytes: b"visible".to_vec(),
            present: true,
        });
        agg.push(ScanEvent::Essid {
            bytes: b"ignored".to_vec(),
            present: false,
        });
        assert_eq!(agg.finish()[0].essid, "");
    }

    #[test]
    fn test_other_events_leave_records_untouched() {
        let mut agg = Aggregator::new();
        agg.push(addr(0));
        agg.push(ScanEvent::Other(crate::core::events::SIOCGIWFREQ));
        agg.push(ScanEvent::Other(0xBEEF)); // unknown token, logged only
        let aps = agg.finish();
        assert_eq!(aps.len(), 1);
        assert_eq!(aps[0].essid, "");
    }

    // =========================================================================
    // ESSID escaping
    // =========================================================================

    #[test]
    fn test_escape_essid_passes_printable_ascii() {
        assert_eq!(escape_essid(b"Home Network 5G"), "Home Network 5G");
    }

    #[test]
    fn test_escape_essid_hex_escapes_control_bytes() {
        assert_eq!(escape_essid(b"a\x00b\xffc"), "a\\x00b\\xFFc");
    }

    #[test]
    fn test_escape_essid_clamps_oversized_input() {
        let long = vec![b'A'; 80];
        assert_eq!(escape_essid(&long).len(), ESSID_MAX_SIZE);
    }

    #[test]
    fn test_bssid_hex_formatting() {
        let ap = AccessPoint::new([0xde, 0xad, 0xbe, 0xef, 0x00, 0x42]);
        assert_eq!(ap.bssid_hex(), "DEADBEEF0042");
    }
}
