//! Types for inventory scans

use std::fmt;
use std::time::Duration;

use crate::sink::ReportSink;

/// Line written to the sink ahead of every decoded tag notification
pub const SEPARATOR: &str = "----------------------------------";

/// Optional-field bitmask carried in a tag notification.
///
/// Fields present in the frame always follow in the order device ID, EPC,
/// TID, user memory, RSSI, regardless of the bit positions below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags(pub u8);

impl HeaderFlags {
    pub const EPC: u8 = 0x01;
    pub const TID: u8 = 0x02;
    pub const RSSI: u8 = 0x04;
    pub const USER_MEMORY: u8 = 0x08;
    pub const DEVICE_ID: u8 = 0x40;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn has_device_id(self) -> bool {
        self.contains(Self::DEVICE_ID)
    }

    pub fn has_epc(self) -> bool {
        self.contains(Self::EPC)
    }

    pub fn has_tid(self) -> bool {
        self.contains(Self::TID)
    }

    pub fn has_user_memory(self) -> bool {
        self.contains(Self::USER_MEMORY)
    }

    pub fn has_rssi(self) -> bool {
        self.contains(Self::RSSI)
    }
}

/// A single decoded tag notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagReading {
    /// EPC as uppercase hex, if the EPC field was present
    pub epc: Option<String>,
    /// TID as uppercase hex, if the TID field was present
    pub tid: Option<String>,
    /// Signal strength in dBm, if the RSSI field was present
    pub rssi_dbm: Option<f32>,
}

impl TagReading {
    /// Write the reading to `sink`, one line per present field
    pub fn report<S: ReportSink + ?Sized>(&self, sink: &mut S) {
        sink.line(SEPARATOR);
        if let Some(epc) = &self.epc {
            sink.line(&format!("EPC : {}", epc));
        }
        if let Some(tid) = &self.tid {
            sink.line(&format!("TID : {}", tid));
        }
        if let Some(rssi) = self.rssi_dbm {
            sink.line(&format!("RSSI: {:.2} dBm", rssi));
        }
    }
}

/// Timing of the scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Budget for receiving a response, measured from the command write
    pub window: Duration,
    /// Pause between the end of one scan cycle and the next command
    pub idle_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(200),
            idle_delay: Duration::from_millis(100),
        }
    }
}

/// Errors that can occur during RFID operations
#[derive(Debug)]
pub enum UhfError {
    /// Transport layer error (UART, serial, etc.)
    Transport(String),
    /// Invalid parameter passed to a function
    InvalidParameter(String),
    /// Invalid response received from the reader
    InvalidResponse(String),
}

impl fmt::Display for UhfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UhfError::Transport(msg) => write!(f, "transport error: {}", msg),
            UhfError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            UhfError::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

impl std::error::Error for UhfError {}

/// Convert bytes to uppercase hex string
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
