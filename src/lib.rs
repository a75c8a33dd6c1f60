//! Extended-inventory scanner for UHF RFID reader modules.
//!
//! Each scan cycle sends one extended inventory command (EPC + TID + RSSI),
//! waits up to the scan window for a single response frame, decodes tag
//! notifications and reports them line by line to a [`ReportSink`].
//!
//! # Features
//!
//! - `uart-esp32` - UART transport for ESP32 using esp-idf-svc
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use uhf_inventory::{SerialTransport, UhfRfid, WriteSink, DEFAULT_BAUD_RATE};
//!
//! let transport = SerialTransport::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE)?;
//! let mut rfid = UhfRfid::new(transport);
//! let mut sink = WriteSink::new(std::io::stdout());
//!
//! // Scan forever, printing every tag that answers
//! rfid.run(&mut sink, || true);
//! ```

mod crc;
mod decoder;
mod frame;
mod reader;
mod sink;
mod transport;
mod types;

#[cfg(feature = "uart-esp32")]
mod uart;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use crc::checksum;
pub use decoder::{decode_response, decode_tag_notification};
pub use frame::{Command, Frame, ResponseKind, FRAME_CAPACITY, MAX_PAYLOAD_LEN, START};
pub use reader::UhfRfid;
pub use sink::{LogSink, ReportSink, WriteSink};
pub use transport::RfidTransport;
pub use types::{HeaderFlags, ScanConfig, TagReading, UhfError, SEPARATOR};

#[cfg(feature = "uart-esp32")]
pub use uart::UartTransport;

#[cfg(feature = "serial")]
pub use serial::{SerialTransport, DEFAULT_BAUD_RATE};
