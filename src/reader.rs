use log::{debug, error, trace, warn};
use std::time::{Duration, Instant};

use crate::decoder::decode_response;
use crate::frame::{Command, Frame, MAX_PAYLOAD_LEN, START};
use crate::sink::ReportSink;
use crate::transport::RfidTransport;
use crate::types::{ScanConfig, TagReading, UhfError};

/// Progress of the frame reader within one scan window
#[derive(Debug)]
enum ReadState {
    /// Discarding bytes until a start marker arrives
    Hunting,
    /// Start marker seen, length byte next
    ReadingLength,
    /// Collecting the `L + 2` bytes after the length byte
    ReadingBody(Frame),
}

pub struct UhfRfid<T: RfidTransport> {
    transport: T,
    config: ScanConfig,
}

impl<T: RfidTransport> UhfRfid<T> {
    /// Create a new RFID reader instance with the given transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: ScanConfig::default(),
        }
    }

    /// Create a reader with custom scan timing
    pub fn with_config(transport: T, config: ScanConfig) -> Result<Self, UhfError> {
        if config.window.is_zero() {
            return Err(UhfError::InvalidParameter(
                "Scan window must be longer than zero".into(),
            ));
        }
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Give back the underlying transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run one scan cycle: send an extended inventory, wait for one frame
    /// within the scan window and report it to `sink` if it is a tag
    /// notification.
    ///
    /// Output is all-or-nothing per frame: every field is decoded before the
    /// first line reaches `sink`, so a malformed frame writes nothing.
    ///
    /// # Returns
    /// The decoded reading, or `None` if no tag answered in time or the
    /// frame was not a tag notification.
    pub fn scan_cycle<S>(&mut self, sink: &mut S) -> Result<Option<TagReading>, UhfError>
    where
        S: ReportSink + ?Sized,
    {
        self.send_command(Command::ExtendedInventory)?;
        let deadline = Instant::now() + self.config.window;

        let Some(frame) = self.read_frame(deadline)? else {
            return Ok(None);
        };
        debug!("Received frame: {:02X?}", frame.as_bytes());

        let reading = decode_response(&frame)?;
        if let Some(reading) = &reading {
            reading.report(sink);
        }
        Ok(reading)
    }

    /// Repeat scan cycles while `keep_running` returns true.
    ///
    /// Errors are confined to the cycle they happen in: they are logged
    /// and the loop carries on after the idle delay.
    ///
    /// # Returns
    /// Number of tag readings reported
    pub fn run<S, F>(&mut self, sink: &mut S, keep_running: F) -> usize
    where
        S: ReportSink + ?Sized,
        F: FnMut() -> bool,
    {
        self.run_with_callback(sink, |_| {}, keep_running)
    }

    /// Run scan cycles for `duration` and collect every reading
    pub fn scan_for_duration<S>(&mut self, sink: &mut S, duration: Duration) -> Vec<TagReading>
    where
        S: ReportSink + ?Sized,
    {
        let start = Instant::now();
        let mut readings = Vec::new();
        self.run_with_callback(
            sink,
            |reading| readings.push(reading.clone()),
            || start.elapsed() < duration,
        );
        readings
    }

    fn run_with_callback<S, C, F>(
        &mut self,
        sink: &mut S,
        mut callback: C,
        mut keep_running: F,
    ) -> usize
    where
        S: ReportSink + ?Sized,
        C: FnMut(&TagReading),
        F: FnMut() -> bool,
    {
        let mut count = 0;
        while keep_running() {
            match self.scan_cycle(sink) {
                Ok(Some(reading)) => {
                    callback(&reading);
                    count += 1;
                }
                Ok(None) => {}
                Err(e) => warn!("Scan cycle failed: {}", e),
            }
            std::thread::sleep(self.config.idle_delay);
        }
        count
    }

    /// Drop stale input, then write the encoded command
    pub(crate) fn send_command(&mut self, command: Command) -> Result<(), UhfError> {
        let stale = self
            .transport
            .bytes_available()
            .map_err(|e| UhfError::Transport(format!("{:?}", e)))?;
        if stale > 0 {
            debug!("Discarding {} stale bytes", stale);
        }
        self.transport
            .clear_input()
            .map_err(|e| UhfError::Transport(format!("{:?}", e)))?;

        let frame = command.encode();
        debug!("Sending command: {:02X?}", frame);
        let written = self
            .transport
            .write(&frame)
            .map_err(|e| UhfError::Transport(format!("{:?}", e)))?;
        if written != frame.len() {
            return Err(UhfError::Transport(format!(
                "Short write: {} of {} bytes",
                written,
                frame.len()
            )));
        }
        Ok(())
    }

    /// Assemble the next frame, giving up at `deadline`.
    ///
    /// Bytes ahead of a start marker are skipped, an oversized length byte
    /// drops the candidate and resumes the search, and a frame cut off by
    /// the deadline is discarded.
    pub(crate) fn read_frame(&mut self, deadline: Instant) -> Result<Option<Frame>, UhfError> {
        let mut state = ReadState::Hunting;

        loop {
            let Some(byte) = self.read_byte(deadline)? else {
                if let ReadState::ReadingBody(frame) = &state {
                    debug!(
                        "Scan window closed mid-frame, discarding {} of {} bytes",
                        frame.as_bytes().len(),
                        frame.total_len()
                    );
                } else if let ReadState::ReadingLength = state {
                    debug!("Scan window closed before length byte");
                }
                return Ok(None);
            };

            state = match state {
                ReadState::Hunting if byte == START => ReadState::ReadingLength,
                ReadState::Hunting => {
                    trace!("Skipping noise byte 0x{:02X}", byte);
                    ReadState::Hunting
                }
                ReadState::ReadingLength if byte as usize > MAX_PAYLOAD_LEN => {
                    warn!(
                        "Dropping frame with length {} (max {})",
                        byte, MAX_PAYLOAD_LEN
                    );
                    ReadState::Hunting
                }
                ReadState::ReadingLength => ReadState::ReadingBody(Frame::begin(byte)?),
                ReadState::ReadingBody(mut frame) => {
                    frame.push(byte)?;
                    if frame.is_complete() {
                        return Ok(Some(frame));
                    }
                    ReadState::ReadingBody(frame)
                }
            };
        }
    }

    /// Read a single byte, waiting no later than `deadline`
    pub(crate) fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>, UhfError> {
        let mut buf = [0u8; 1];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let timeout_ms = remaining.as_millis().clamp(1, u32::MAX as u128) as u32;

            match self.transport.read(&mut buf, timeout_ms) {
                Ok(0) => {}
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) => {
                    error!("Read error: {:?}", e);
                    return Err(UhfError::Transport(format!("{:?}", e)));
                }
            }
        }
    }
}
