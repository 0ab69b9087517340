/*!
 * WPA/RSN information element decoding
 *
 * Scan results embed concatenated information elements: one id byte, one
 * declared-length byte, then the payload. Two ids carry security data we
 * understand: the vendor element (0xdd, designated OUI 00:50:f2 type 1)
 * and the native RSN element (0x30). Everything else is dumped as hex.
 *
 * Driver and over-the-air data is untrusted, so every read is bounds
 * checked against the effective element length. A truncated element is
 * never an error; decoding just stops and the descriptor keeps whatever
 * defaults remain.
 */

use std::fmt;
use std::fmt::Write as _;

/// Vendor-specific element id (WPA1 among many others).
pub const WPA_VENDOR_ID: u8 = 0xdd;
/// Native RSN (WPA2) element id.
pub const RSN_ID: u8 = 0x30;

const WPA_OUI: [u8; 3] = [0x00, 0x50, 0xf2];
const RSN_OUI: [u8; 3] = [0x00, 0x0f, 0xac];

const CIPHER_NAMES: [&str; 6] = ["none", "WEP-40", "TKIP", "WRAP", "CCMP", "WEP-104"];
const KEY_MGMT_NAMES: [&str; 3] = ["none", "802.1x", "PSK"];

/// One cipher or key-management suite as rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suite {
    Named(&'static str),
    /// In-alphabet OUI but an id past the end of the name table.
    Unknown(u8),
    /// Suite selector with an OUI outside the element's alphabet.
    Proprietary,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suite::Named(name) => f.write_str(name),
            Suite::Unknown(id) => write!(f, "unknown ({})", id),
            Suite::Proprietary => f.write_str("Proprietary"),
        }
    }
}

/// Short IEs omit everything past the version field; the wire meaning of
/// that is the minimal legacy cipher.
const LEGACY_FALLBACK: Suite = Suite::Named("TKIP");

/// Decoded WPA or RSN element. Fields past the point where the element was
/// truncated keep their defaults; that is a policy of the format, not a
/// decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityDescriptor {
    /// True for the native RSN element, false for the vendor WPA element.
    pub is_rsn: bool,
    pub version: u16,
    pub group_cipher: Suite,
    pub pairwise_ciphers: Vec<Suite>,
    pub auth_suites: Vec<Suite>,
    pub preauth_supported: bool,
}

impl fmt::Display for SecurityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rsn {
            writeln!(f, "IEEE 802.11i/WPA2 Version {}", self.version)?;
        } else {
            writeln!(f, "WPA Version {}", self.version)?;
        }
        writeln!(f, "    Group Cipher : {}", self.group_cipher)?;
        write!(f, "    Pairwise Ciphers ({}) :", self.pairwise_ciphers.len())?;
        for suite in &self.pairwise_ciphers {
            write!(f, " {}", suite)?;
        }
        writeln!(f)?;
        write!(
            f,
            "    Authentication Suites ({}) :",
            self.auth_suites.len()
        )?;
        for suite in &self.auth_suites {
            write!(f, " {}", suite)?;
        }
        writeln!(f)?;
        if self.preauth_supported {
            writeln!(f, "    Preauthentication Supported")?;
        }
        Ok(())
    }
}

/// Map one 4-byte suite selector (3-byte OUI + id) through a name table.
fn decode_suite(selector: &[u8], oui: &[u8; 3], names: &'static [&'static str]) -> Suite {
    if selector[..3] != oui[..] {
        return Suite::Proprietary;
    }
    let id = selector[3];
    match names.get(id as usize) {
        Some(name) => Suite::Named(name),
        None => Suite::Unknown(id),
    }
}

/// Decode one WPA or RSN information element.
///
/// Returns `None` when the element is not a security element we understand:
/// an unrelated id, a vendor element with a foreign OUI or type, or a header
/// too short to hold even the version field. The caller is expected to fall
/// back to an opaque hex dump.
pub fn decode_security_element(iebuf: &[u8]) -> Option<SecurityDescriptor> {
    if iebuf.len() < 2 {
        return None;
    }
    // The declared length can lie; never trust it past the caller's buffer.
    let ielen = (iebuf[1] as usize + 2).min(iebuf.len());

    let (is_rsn, mut offset, oui) = match iebuf[0] {
        RSN_ID => {
            if ielen < 4 {
                return None;
            }
            (true, 2usize, RSN_OUI)
        }
        WPA_VENDOR_ID => {
            // Plenty of non-WPA elements share the vendor id; require the
            // designated OUI and type byte 1 before claiming this one.
            if ielen < 8 || iebuf[2..5] != WPA_OUI || iebuf[5] != 0x01 {
                return None;
            }
            (false, 6usize, WPA_OUI)
        }
        _ => return None,
    };

    let version = u16::from_le_bytes([iebuf[offset], iebuf[offset + 1]]);
    offset += 2;

    let mut desc = SecurityDescriptor {
        is_rsn,
        version,
        group_cipher: LEGACY_FALLBACK,
        pairwise_ciphers: vec![LEGACY_FALLBACK],
        auth_suites: Vec::new(),
        preauth_supported: false,
    };

    // From here on everything is optional; a short element keeps defaults.
    if ielen < offset + 4 {
        return Some(desc);
    }
    desc.group_cipher = decode_suite(&iebuf[offset..offset + 4], &oui, &CIPHER_NAMES);
    offset += 4;

    if ielen < offset + 2 {
        return Some(desc);
    }
    let count = u16::from_le_bytes([iebuf[offset], iebuf[offset + 1]]) as usize;
    offset += 2;
    if ielen < offset + 4 * count {
        desc.pairwise_ciphers = Vec::new();
        return Some(desc);
    }
    desc.pairwise_ciphers = (0..count)
        .map(|i| decode_suite(&iebuf[offset + 4 * i..offset + 4 * i + 4], &oui, &CIPHER_NAMES))
        .collect();
    offset += 4 * count;

    if ielen < offset + 2 {
        return Some(desc);
    }
    let count = u16::from_le_bytes([iebuf[offset], iebuf[offset + 1]]) as usize;
    offset += 2;
    if ielen < offset + 4 * count {
        return Some(desc);
    }
    desc.auth_suites = (0..count)
        .map(|i| decode_suite(&iebuf[offset + 4 * i..offset + 4 * i + 4], &oui, &KEY_MGMT_NAMES))
        .collect();
    offset += 4 * count;

    if ielen < offset + 1 {
        return Some(desc);
    }
    desc.preauth_supported = iebuf[offset] & 0x01 != 0;

    Some(desc)
}

/// Render a buffer of concatenated information elements for display.
///
/// Each element is dispatched to the security decoder when its id matches,
/// otherwise dumped as hex. The walk advances by the declared length but is
/// clamped to the buffer end, so a lying length byte terminates the walk
/// instead of reading out of bounds.
pub fn format_information_elements(buffer: &[u8]) -> String {
    let mut out = String::new();
    let mut offset = 0;

    while offset + 2 <= buffer.len() {
        let declared = buffer[offset + 1] as usize + 2;
        let end = (offset + declared).min(buffer.len());
        let element = &buffer[offset..end];

        out.push_str("IE: ");
        match decode_security_element(element) {
            Some(desc) => {
                let _ = write!(out, "{}", desc);
            }
            None => {
                out.push_str("Unknown: ");
                for &b in element {
                    let _ = write!(out, "{:02X}", b);
                }
                out.push('\n');
            }
        }

        offset += declared;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Mode recognition
    // =========================================================================

    #[test]
    fn test_short_rsn_element_falls_back_to_tkip() {
        // RSN tag, declared length 2, version 1: effective length 4 stops
        // decoding right after the version field.
        let desc = decode_security_element(&[0x30, 0x02, 0x01, 0x00]).unwrap();
        assert!(desc.is_rsn);
        assert_eq!(desc.version, 1);
        assert_eq!(desc.group_cipher, Suite::Named("TKIP"));
        assert_eq!(desc.pairwise_ciphers, vec![Suite::Named("TKIP")]);
        assert!(desc.auth_suites.is_empty());
        assert!(!desc.preauth_supported);
    }

    #[test]
    fn test_vendor_element_with_designated_prefix() {
        let desc =
            decode_security_element(&[0xdd, 0x06, 0x00, 0x50, 0xf2, 0x01, 0x01, 0x00]).unwrap();
        assert!(!desc.is_rsn);
        assert_eq!(desc.version, 1);
        assert_eq!(desc.group_cipher, Suite::Named("TKIP"));
    }

    #[test]
    fn test_vendor_element_with_foreign_prefix_is_opaque() {
        assert!(decode_security_element(&[0xdd, 0x06, 0x00, 0x50, 0xf1, 0x01, 0x01, 0x00]).is_none());
    }

    #[test]
    fn test_vendor_element_with_wrong_type_byte_is_opaque() {
        // Designated OUI but type 2 (WMM for instance), not the security type.
        assert!(decode_security_element(&[0xdd, 0x06, 0x00, 0x50, 0xf2, 0x02, 0x01, 0x00]).is_none());
    }

    #[test]
    fn test_unrelated_element_id_is_opaque() {
        assert!(decode_security_element(&[0x00, 0x04, b't', b'e', b's', b't']).is_none());
    }

    #[test]
    fn test_truncated_rsn_header_is_opaque() {
        assert!(decode_security_element(&[0x30, 0x02, 0x01]).is_none());
    }

    // =========================================================================
    // Suite alphabets
    // =========================================================================

    #[test]
    fn test_cipher_alphabet_mapping() {
        let expected = ["none", "WEP-40", "TKIP", "WRAP", "CCMP", "WEP-104"];
        for (id, name) in expected.iter().enumerate() {
            let selector = [0x00, 0x0f, 0xac, id as u8];
            assert_eq!(
                decode_suite(&selector, &RSN_OUI, &CIPHER_NAMES),
                Suite::Named(name)
            );
        }
    }

    #[test]
    fn test_out_of_alphabet_cipher_id_reports_unknown() {
        let suite = decode_suite(&[0x00, 0x0f, 0xac, 9], &RSN_OUI, &CIPHER_NAMES);
        assert_eq!(suite, Suite::Unknown(9));
        assert_eq!(suite.to_string(), "unknown (9)");
    }

    #[test]
    fn test_foreign_oui_selector_is_proprietary() {
        let suite = decode_suite(&[0x00, 0x40, 0x96, 0x02], &RSN_OUI, &CIPHER_NAMES);
        assert_eq!(suite, Suite::Proprietary);
    }

    // =========================================================================
    // Full elements and truncation policies
    // =========================================================================

    /// RSN element: version 1, group CCMP, pairwise [CCMP, TKIP], auth [PSK],
    /// preauth bit set.
    fn full_rsn_element() -> Vec<u8> {
        vec![
            0x30, 0x17, // id, declared length 23
            0x01, 0x00, // version
            0x00, 0x0f, 0xac, 0x04, // group CCMP
            0x02, 0x00, // pairwise count
            0x00, 0x0f, 0xac, 0x04, // CCMP
            0x00, 0x0f, 0xac, 0x02, // TKIP
            0x01, 0x00, // auth count
            0x00, 0x0f, 0xac, 0x02, // PSK
            0x01, // capability byte, bit 0 = preauth
        ]
    }

    #[test]
    fn test_full_rsn_element_decodes_every_field() {
        let desc = decode_security_element(&full_rsn_element()).unwrap();
        assert!(desc.is_rsn);
        assert_eq!(desc.version, 1);
        assert_eq!(desc.group_cipher, Suite::Named("CCMP"));
        assert_eq!(
            desc.pairwise_ciphers,
            vec![Suite::Named("CCMP"), Suite::Named("TKIP")]
        );
        assert_eq!(desc.auth_suites, vec![Suite::Named("PSK")]);
        assert!(desc.preauth_supported);
    }

    #[test]
    fn test_pairwise_list_truncated_by_buffer_yields_partial_descriptor() {
        // Declares two pairwise suites but the buffer ends after the count.
        let ie = vec![
            0x30, 0x17, 0x01, 0x00, 0x00, 0x0f, 0xac, 0x04, 0x02, 0x00,
        ];
        let desc = decode_security_element(&ie).unwrap();
        assert_eq!(desc.group_cipher, Suite::Named("CCMP"));
        assert!(desc.pairwise_ciphers.is_empty());
        assert!(desc.auth_suites.is_empty());
    }

    #[test]
    fn test_element_ending_after_group_keeps_pairwise_fallback() {
        let ie = vec![0x30, 0x06, 0x01, 0x00, 0x00, 0x0f, 0xac, 0x04];
        let desc = decode_security_element(&ie).unwrap();
        assert_eq!(desc.group_cipher, Suite::Named("CCMP"));
        assert_eq!(desc.pairwise_ciphers, vec![Suite::Named("TKIP")]);
    }

    // =========================================================================
    // Element walk
    // =========================================================================

    #[test]
    fn test_walk_formats_each_element() {
        let mut buf = vec![0x00, 0x03, b'a', b'b', b'c']; // SSID element, opaque here
        buf.extend_from_slice(&full_rsn_element());
        let out = format_information_elements(&buf);
        assert!(out.starts_with("IE: Unknown: 0003616263\n"));
        assert!(out.contains("IE: IEEE 802.11i/WPA2 Version 1"));
        assert!(out.contains("Group Cipher : CCMP"));
        assert!(out.contains("Pairwise Ciphers (2) : CCMP TKIP"));
        assert!(out.contains("Authentication Suites (1) : PSK"));
        assert!(out.contains("Preauthentication Supported"));
    }

    #[test]
    fn test_walk_with_lying_length_terminates_at_buffer_end() {
        // Declared length 0xF0 overshoots a 6-byte buffer; the element is
        // clamped, dumped, and the walk stops.
        let buf = [0xab, 0xf0, 0x01, 0x02, 0x03, 0x04];
        let out = format_information_elements(&buf);
        assert_eq!(out, "IE: Unknown: ABF001020304\n");
    }

    #[test]
    fn test_walk_ignores_trailing_fragment() {
        // A single trailing byte cannot hold an id + length pair.
        let out = format_information_elements(&[0x42]);
        assert!(out.is_empty());
    }
}
