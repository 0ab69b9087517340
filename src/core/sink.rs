/*!
 * Result sink
 *
 * Streams a finished result set to a downstream consumer over a named
 * pipe. The wire layout is a one-byte record count followed by that many
 * fixed-size records; the consumer knows the record size out of band.
 *
 * Opening the pipe for writing blocks until a reader attaches. That is the
 * synchronization handshake with the consumer process, so there is no
 * timeout on it.
 */

use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use log::info;

use crate::core::aggregate::{AccessPoint, ESSID_MAX_SIZE, MAX_RESULTS};
use crate::core::error::ScanError;

/// Fixed width of the ESSID field: a fully escaped 32-byte ESSID
/// (4 characters per byte) plus a NUL terminator.
pub const ESSID_FIELD_LEN: usize = 4 * ESSID_MAX_SIZE + 1;

/// One record on the wire: 6-byte BSSID, NUL-padded ESSID field, strength.
pub const RECORD_LEN: usize = 6 + ESSID_FIELD_LEN + 1;

/// Encode the result set in the documented wire layout.
pub fn encode_results<W: Write>(out: &mut W, aps: &[AccessPoint]) -> io::Result<()> {
    let count = aps.len().min(MAX_RESULTS);
    out.write_all(&[count as u8])?;
    for ap in &aps[..count] {
        out.write_all(&ap.bssid)?;
        let mut field = [0u8; ESSID_FIELD_LEN];
        let text = ap.essid.as_bytes();
        let n = text.len().min(ESSID_FIELD_LEN - 1);
        field[..n].copy_from_slice(&text[..n]);
        out.write_all(&field)?;
        out.write_all(&[ap.strength as u8])?;
    }
    Ok(())
}

/// Create the FIFO if needed, wait for a reader, write the result set.
///
/// One attempt only; any create/open/write failure is reported as a channel
/// error and retrying is the caller's decision.
pub fn write_results(path: &Path, aps: &[AccessPoint]) -> Result<(), ScanError> {
    create_fifo(path).map_err(ScanError::Channel)?;

    info!("waiting for a reader on {}", path.display());
    let mut fifo = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(ScanError::Channel)?;

    let mut encoded = Vec::with_capacity(1 + aps.len() * RECORD_LEN);
    encode_results(&mut encoded, aps).map_err(ScanError::Channel)?;
    fifo.write_all(&encoded).map_err(ScanError::Channel)?;
    info!("wrote {} records to {}", aps.len().min(MAX_RESULTS), path.display());
    Ok(())
}

/// mkfifo with world read/write; an already existing pipe is fine.
fn create_fifo(path: &Path) -> io::Result<()> {
    let cpath = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;
    let rc = unsafe { libc::mkfifo(cpath.as_ptr(), 0o666) };
    if rc == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EEXIST) {
        Ok(())
    } else {
        Err(err)
    }
}
