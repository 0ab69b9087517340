/*!
 * Linux wireless-extensions transport and tokenizer
 *
 * The ioctl-level implementation of the [`Transport`] and [`EventTokenizer`]
 * boundaries: a datagram socket as the control channel, SIOCGIWRANGE for
 * capability metadata, SIOCSIWSCAN/SIOCGIWSCAN for the scan itself, and the
 * wireless event-stream layout from linux/wireless.h.
 */

use std::ffi::c_void;
use std::io;
use std::mem;
use std::os::unix::io::RawFd;

use log::debug;

use crate::core::events::{
    EventTokenizer, ScanEvent, IWEVGENIE, IWEVQUAL, SIOCGIWAP, SIOCGIWESSID,
};
use crate::core::ie::format_information_elements;
use crate::core::scan::MIN_SCAN_VERSION;
use crate::core::transport::{Capabilities, FetchError, RequestError, Transport};

// ioctl request codes.
const SIOCGIWRANGE: libc::c_ulong = 0x8B0B;
const SIOCSIWSCAN: libc::c_ulong = 0x8B18;
const SIOCGIWSCAN: libc::c_ulong = 0x8B19;

// Every wireless event starts with a 16-bit total length and 16-bit command.
const IW_EV_LCP_LEN: usize = 4;
// WE-19 dropped the meaningless iw_point pointer from event streams.
const IW_EV_POINT_STRIP_VERSION: u8 = 19;

const IW_MAX_BITRATES: usize = 32;
const IW_MAX_ENCODING_SIZES: usize = 8;
const IW_MAX_TXPOWER: usize = 8;

#[repr(C)]
#[derive(Clone, Copy)]
struct IwPoint {
    pointer: *mut c_void,
    length: u16,
    flags: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
union IwReqData {
    point: IwPoint,
    raw: [u8; 16],
}

/// struct iwreq: interface name plus a request-specific payload.
#[repr(C)]
struct IwReq {
    ifr_name: [libc::c_char; libc::IFNAMSIZ],
    u: IwReqData,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct IwQuality {
    qual: u8,
    level: u8,
    noise: u8,
    updated: u8,
}

/// struct iw_range through the version fields this tool reads. The kernel
/// copies its full struct, so a trailing pad keeps the buffer large enough
/// for the members past `we_version_source`.
#[repr(C)]
#[allow(dead_code)]
struct IwRange {
    throughput: u32,
    min_nwid: u32,
    max_nwid: u32,
    old_num_channels: u16,
    old_num_frequency: u8,
    scan_capa: u8,
    event_capa: [u32; 6],
    sensitivity: i32,
    max_qual: IwQuality,
    avg_qual: IwQuality,
    num_bitrates: u8,
    bitrate: [i32; IW_MAX_BITRATES],
    min_rts: i32,
    max_rts: i32,
    min_frag: i32,
    max_frag: i32,
    min_pmp: i32,
    max_pmp: i32,
    min_pmt: i32,
    max_pmt: i32,
    pmp_flags: u16,
    pmt_flags: u16,
    pm_capa: u16,
    encoding_size: [u16; IW_MAX_ENCODING_SIZES],
    num_encoding_sizes: u8,
    max_encoding_tokens: u8,
    encoding_login_index: u8,
    txpower_capa: u16,
    num_txpower: u8,
    txpower: [i32; IW_MAX_TXPOWER],
    we_version_compiled: u8,
    we_version_source: u8,
    tail: [u8; 640],
}

/// Wireless-extensions control channel for one interface.
pub struct WextTransport {
    fd: RawFd,
    ifname: [libc::c_char; libc::IFNAMSIZ],
}

impl WextTransport {
    /// Open a control socket bound to nothing in particular; wireless ioctls
    /// only need any INET datagram socket plus the interface name.
    pub fn open(interface: &str) -> io::Result<Self> {
        let bytes = interface.as_bytes();
        if bytes.is_empty() || bytes.len() >= libc::IFNAMSIZ {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid interface name: {:?}", interface),
            ));
        }

        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        let mut ifname = [0 as libc::c_char; libc::IFNAMSIZ];
        for (dst, &src) in ifname.iter_mut().zip(bytes) {
            *dst = src as libc::c_char;
        }
        Ok(Self { fd, ifname })
    }

    fn new_request(&self) -> IwReq {
        IwReq {
            ifr_name: self.ifname,
            u: IwReqData { raw: [0; 16] },
        }
    }

    fn ioctl(&self, request: libc::c_ulong, req: &mut IwReq) -> io::Result<()> {
        let rc = unsafe { libc::ioctl(self.fd, request, req as *mut IwReq) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}

impl Drop for WextTransport {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Transport for WextTransport {
    fn capabilities(&self) -> Option<Capabilities> {
        let mut range: IwRange = unsafe { mem::zeroed() };
        let mut req = self.new_request();
        req.u.point = IwPoint {
            pointer: &mut range as *mut IwRange as *mut c_void,
            length: mem::size_of::<IwRange>() as u16,
            flags: 0,
        };
        self.ioctl(SIOCGIWRANGE, &mut req).ok()?;
        Some(Capabilities {
            supports_scan: range.we_version_compiled >= MIN_SCAN_VERSION,
            protocol_version: range.we_version_compiled,
        })
    }

    fn request_scan(&self) -> Result<(), RequestError> {
        let mut req = self.new_request();
        match self.ioctl(SIOCSIWSCAN, &mut req) {
            Ok(()) => Ok(()),
            Err(err) if err.raw_os_error() == Some(libc::EPERM) => {
                Err(RequestError::PermissionDenied)
            }
            Err(err) => Err(RequestError::Io(err)),
        }
    }

    fn fetch_results(&self, buffer: &mut [u8]) -> Result<usize, FetchError> {
        let mut req = self.new_request();
        req.u.point = IwPoint {
            pointer: buffer.as_mut_ptr() as *mut c_void,
            length: buffer.len() as u16,
            flags: 0,
        };
        match self.ioctl(SIOCGIWSCAN, &mut req) {
            Ok(()) => Ok(unsafe { req.u.point.length } as usize),
            Err(err) => match err.raw_os_error() {
                // On E2BIG the kernel leaves its total length in the request
                // as a sizing hint, when it knows it.
                Some(libc::E2BIG) => Err(FetchError::BufferTooSmall {
                    hint: unsafe { req.u.point.length } as usize,
                }),
                Some(libc::EAGAIN) => Err(FetchError::NotReady),
                _ => Err(FetchError::Io(err)),
            },
        }
    }
}

/// Tokenizer for the kernel's wireless event stream.
pub struct WextTokenizer;

impl EventTokenizer for WextTokenizer {
    fn tokenize(&self, buffer: &[u8], protocol_version: u8) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        let mut offset = 0;

        while offset + IW_EV_LCP_LEN <= buffer.len() {
            let len = read_u16(buffer, offset) as usize;
            let cmd = read_u16(buffer, offset + 2);
            if len < IW_EV_LCP_LEN {
                break; // malformed stream, no forward progress possible
            }
            let end = (offset + len).min(buffer.len());
            let payload = &buffer[offset + IW_EV_LCP_LEN..end];

            match cmd {
                SIOCGIWAP => {
                    // Payload is a sockaddr: 16-bit family, then the MAC.
                    if payload.len() >= 8 {
                        let mut mac = [0u8; 6];
                        mac.copy_from_slice(&payload[2..8]);
                        events.push(ScanEvent::Address(mac));
                    }
                }
                IWEVQUAL => {
                    if !payload.is_empty() {
                        events.push(ScanEvent::Quality(payload[0] as i8));
                    }
                }
                SIOCGIWESSID => {
                    if let Some((flags, data)) = point_payload(payload, protocol_version) {
                        events.push(ScanEvent::Essid {
                            bytes: data.to_vec(),
                            present: flags != 0,
                        });
                    }
                }
                IWEVGENIE => {
                    // Display-only: the embedded information elements never
                    // feed record fields.
                    if let Some((_, data)) = point_payload(payload, protocol_version) {
                        debug!(
                            "generic elements:\n{}",
                            format_information_elements(data)
                        );
                    }
                    events.push(ScanEvent::Other(cmd));
                }
                other => events.push(ScanEvent::Other(other)),
            }

            offset += len;
        }

        events
    }
}

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([buffer[offset], buffer[offset + 1]])
}

/// Extract the flags and data of an iw_point event payload. Streams from
/// WE-19 kernels pack length+flags directly; older streams still carry the
/// (meaningless) userspace pointer first.
fn point_payload(payload: &[u8], protocol_version: u8) -> Option<(u16, &[u8])> {
    let off = if protocol_version >= IW_EV_POINT_STRIP_VERSION {
        0
    } else {
        mem::size_of::<*const c_void>()
    };
    if payload.len() < off + 4 {
        return None;
    }
    let length = read_u16(payload, off) as usize;
    let flags = read_u16(payload, off + 2);
    let start = off + 4;
    let data = &payload[start..payload.len().min(start + length)];
    Some((flags, data))
}
