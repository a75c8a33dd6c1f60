//! Tag notification decoding
//!
//! A notification body is a header flags byte followed by the optional
//! fields it announces:
//!
//! ```text
//! [flags][device ID: 4][EPC len][EPC][TID len][TID][mem len][mem][RSSI: i16 BE]
//! ```
//!
//! Every read goes through [`Cursor`], which refuses to step past the end of
//! the declared payload, so a flags byte announcing more fields than the
//! frame carries aborts the decode instead of reading trailer bytes.

use log::{debug, warn};

use crate::frame::{Frame, ResponseKind};
use crate::types::{bytes_to_hex, HeaderFlags, TagReading, UhfError};

const DEVICE_ID_LEN: usize = 4;
const RSSI_SCALE: f32 = 100.0;

/// Read position within a bounded payload
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn would_exceed(&self, len: usize) -> bool {
        len > self.remaining()
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], UhfError> {
        if self.would_exceed(len) {
            return Err(UhfError::InvalidResponse(format!(
                "{} needs {} bytes at offset {}, only {} left in payload",
                field,
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn skip(&mut self, len: usize, field: &str) -> Result<(), UhfError> {
        self.take(len, field).map(|_| ())
    }

    fn read_u8(&mut self, field: &str) -> Result<u8, UhfError> {
        self.take(1, field).map(|b| b[0])
    }

    fn read_i16_be(&mut self, field: &str) -> Result<i16, UhfError> {
        let bytes = self.take(2, field)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Length-prefixed field
    fn read_prefixed(&mut self, field: &str) -> Result<&'a [u8], UhfError> {
        let len = self.read_u8(field)? as usize;
        self.take(len, field)
    }
}

/// Decode a received frame.
///
/// Returns `Ok(None)` for response codes other than a tag notification and
/// for frames too short to carry a code.
pub fn decode_response(frame: &Frame) -> Result<Option<TagReading>, UhfError> {
    match frame.response_kind() {
        Some(ResponseKind::TagNotification) => {
            if !frame.checksum_matches() {
                debug!(
                    "Trailer checksum {:04X?} differs from computed value",
                    frame.checksum()
                );
            }
            decode_tag_notification(frame.data()).map(Some)
        }
        Some(ResponseKind::Other(code)) => {
            debug!("Ignoring response code 0x{:02X}", code);
            Ok(None)
        }
        None => {
            debug!("Ignoring frame without response code: {:02X?}", frame.as_bytes());
            Ok(None)
        }
    }
}

/// Decode the body of a tag notification (everything after the code byte)
pub fn decode_tag_notification(data: &[u8]) -> Result<TagReading, UhfError> {
    let mut cursor = Cursor::new(data);
    let reading = decode_fields(&mut cursor).inspect_err(|e| {
        warn!("Malformed tag notification {:02X?}: {}", data, e);
    })?;
    if cursor.remaining() > 0 {
        debug!(
            "{} unclaimed bytes after tag fields ending at offset {}",
            cursor.remaining(),
            cursor.position()
        );
    }
    Ok(reading)
}

pub(crate) fn decode_fields(cursor: &mut Cursor<'_>) -> Result<TagReading, UhfError> {
    let flags = HeaderFlags(cursor.read_u8("Header flags")?);
    let mut reading = TagReading::default();

    if flags.has_device_id() {
        cursor.skip(DEVICE_ID_LEN, "Device ID")?;
    }
    if flags.has_epc() {
        reading.epc = Some(bytes_to_hex(cursor.read_prefixed("EPC")?));
    }
    if flags.has_tid() {
        reading.tid = Some(bytes_to_hex(cursor.read_prefixed("TID")?));
    }
    if flags.has_user_memory() {
        cursor.read_prefixed("User memory")?;
    }
    if flags.has_rssi() {
        let raw = cursor.read_i16_be("RSSI")?;
        reading.rssi_dbm = Some(raw as f32 / RSSI_SCALE);
    }

    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_refuses_to_overrun() {
        let mut cursor = Cursor::new(&[0x01, 0x02]);
        assert!(cursor.would_exceed(3));
        assert!(matches!(
            cursor.take(3, "field"),
            Err(UhfError::InvalidResponse(_))
        ));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.take(2, "field").unwrap(), &[0x01, 0x02]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_decode_device_id_and_user_memory_are_skipped() {
        // flags: device ID + EPC + user memory
        let data = [
            0x49, // flags
            0xDE, 0xAD, 0xBE, 0xEF, // device ID
            0x01, 0x42, // EPC
            0x02, 0x00, 0x00, // user memory
        ];
        let mut cursor = Cursor::new(&data);
        let reading = decode_fields(&mut cursor).unwrap();
        assert_eq!(reading.epc.as_deref(), Some("42"));
        assert_eq!(reading.tid, None);
        assert_eq!(reading.rssi_dbm, None);
        assert_eq!(cursor.position(), data.len());
    }

    #[test]
    fn test_decode_zero_length_epc() {
        let reading = decode_tag_notification(&[0x01, 0x00]).unwrap();
        assert_eq!(reading.epc.as_deref(), Some(""));
    }

    #[test]
    fn test_decode_positive_rssi() {
        // 0x0100 = 256 -> 2.56 dBm
        let reading = decode_tag_notification(&[0x04, 0x01, 0x00]).unwrap();
        assert_eq!(reading.rssi_dbm, Some(2.56));
    }

    #[test]
    fn test_decode_epc_length_past_payload_end() {
        let result = decode_tag_notification(&[0x01, 0x08, 0xAA, 0xBB]);
        assert!(matches!(result, Err(UhfError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_truncated_rssi() {
        let result = decode_tag_notification(&[0x04, 0xFF]);
        assert!(matches!(result, Err(UhfError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(matches!(
            decode_tag_notification(&[]),
            Err(UhfError::InvalidResponse(_))
        ));
    }
}
