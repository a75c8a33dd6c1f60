//! Wire frames exchanged with the reader module
//!
//! Both directions share one layout:
//!
//! ```text
//! [0xBB][L][code][L - 1 data bytes][CRC hi][CRC lo]
//! ```
//!
//! `L` counts the code byte and the data bytes only, so a complete frame is
//! `L + 4` bytes long. The CRC covers the `L` bytes starting at the code.

use heapless::Vec as BoundedVec;

use crate::crc::checksum;
use crate::types::UhfError;

/// Start-of-frame marker
pub const START: u8 = 0xBB;

/// Largest declared length a frame may carry
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Start marker, length byte and two checksum bytes around the payload
pub const FRAME_OVERHEAD: usize = 4;

pub const FRAME_CAPACITY: usize = MAX_PAYLOAD_LEN + FRAME_OVERHEAD;

/// Commands this driver sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Extended inventory requesting EPC, TID and RSSI
    ExtendedInventory,
}

impl Command {
    const EXTENDED_INVENTORY: u8 = 0x21;
    const INVENTORY_TID_EPC_RSSI: u8 = 0x0C;

    pub fn code(self) -> u8 {
        match self {
            Command::ExtendedInventory => Self::EXTENDED_INVENTORY,
        }
    }

    fn params(self) -> &'static [u8] {
        match self {
            Command::ExtendedInventory => &[Self::INVENTORY_TID_EPC_RSSI],
        }
    }

    /// Build the complete frame for this command, checksum included
    pub fn encode(self) -> Vec<u8> {
        let params = self.params();
        let mut frame = Vec::with_capacity(params.len() + 1 + FRAME_OVERHEAD);
        frame.push(START);
        frame.push((params.len() + 1) as u8);
        frame.push(self.code());
        frame.extend_from_slice(params);

        let crc = checksum(&frame[2..]);
        frame.push((crc >> 8) as u8);
        frame.push((crc & 0xFF) as u8);
        frame
    }
}

/// Response types, keyed by the code byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Tag notification produced by an inventory round
    TagNotification,
    /// Anything else; ignored by this driver
    Other(u8),
}

impl ResponseKind {
    const TAG_NOTIFICATION: u8 = 0xE0;
}

impl From<u8> for ResponseKind {
    fn from(code: u8) -> Self {
        match code {
            Self::TAG_NOTIFICATION => ResponseKind::TagNotification,
            other => ResponseKind::Other(other),
        }
    }
}

/// A received frame, held in fixed storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: BoundedVec<u8, FRAME_CAPACITY>,
}

impl Frame {
    /// Start assembling a frame whose length byte is `len`
    pub(crate) fn begin(len: u8) -> Result<Self, UhfError> {
        if len as usize > MAX_PAYLOAD_LEN {
            return Err(UhfError::InvalidResponse(format!(
                "Declared length {} exceeds maximum of {}",
                len, MAX_PAYLOAD_LEN
            )));
        }
        let mut bytes = BoundedVec::new();
        bytes
            .extend_from_slice(&[START, len])
            .map_err(|_| UhfError::InvalidResponse("Frame buffer overflow".into()))?;
        Ok(Self { bytes })
    }

    /// Append one body byte; fails once the frame is already complete
    pub(crate) fn push(&mut self, byte: u8) -> Result<(), UhfError> {
        if self.is_complete() {
            return Err(UhfError::InvalidResponse(
                "Byte received past the declared frame end".into(),
            ));
        }
        self.bytes
            .push(byte)
            .map_err(|_| UhfError::InvalidResponse("Frame buffer overflow".into()))
    }

    /// Parse a complete frame from raw bytes
    pub fn from_bytes(raw: &[u8]) -> Result<Self, UhfError> {
        if raw.len() < 2 || raw[0] != START {
            return Err(UhfError::InvalidResponse(format!(
                "Invalid frame header: {:02X?}",
                raw
            )));
        }

        let mut frame = Self::begin(raw[1])?;
        if raw.len() != frame.total_len() {
            return Err(UhfError::InvalidResponse(format!(
                "Frame length mismatch: declared {} bytes, got {}",
                frame.total_len(),
                raw.len()
            )));
        }
        for &byte in &raw[2..] {
            frame.push(byte)?;
        }
        Ok(frame)
    }

    /// Length byte as received
    pub fn declared_len(&self) -> u8 {
        self.bytes[1]
    }

    /// Total size of the frame on the wire
    pub fn total_len(&self) -> usize {
        self.declared_len() as usize + FRAME_OVERHEAD
    }

    pub fn is_complete(&self) -> bool {
        self.bytes.len() == self.total_len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Response code byte.
    ///
    /// `None` on an incomplete frame or when the declared length is zero, in
    /// which case byte 2 already belongs to the checksum trailer.
    pub fn code(&self) -> Option<u8> {
        if self.declared_len() == 0 {
            return None;
        }
        self.bytes.get(2).copied()
    }

    pub fn response_kind(&self) -> Option<ResponseKind> {
        self.code().map(ResponseKind::from)
    }

    /// The `L` bytes covered by the checksum: code followed by data
    pub fn payload(&self) -> &[u8] {
        let end = 2 + self.declared_len() as usize;
        self.bytes.get(2..end).unwrap_or(&[])
    }

    /// Data bytes after the code, bounded by the declared length
    pub fn data(&self) -> &[u8] {
        self.payload().get(1..).unwrap_or(&[])
    }

    /// Trailer checksum as sent by the reader
    pub fn checksum(&self) -> Option<u16> {
        let start = 2 + self.declared_len() as usize;
        match self.bytes.get(start..start + 2) {
            Some(&[hi, lo]) => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }

    pub fn checksum_matches(&self) -> bool {
        self.checksum() == Some(checksum(self.payload()))
    }
}
