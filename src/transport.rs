/// Trait for RFID reader communication backends.
/// Implement this trait for different transports (UART, serial port, etc.)
pub trait RfidTransport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Write data to the transport
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read data from the transport with a timeout in milliseconds.
    ///
    /// Returns `Ok(0)` when the timeout elapses without any data.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Number of received bytes waiting to be read, without blocking
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Clear the input buffer
    fn clear_input(&mut self) -> Result<(), Self::Error>;
}

/// Convert a millisecond timeout into scheduler ticks at `tick_rate_hz`.
///
/// Rounds down, so the wait never outlasts `timeout_ms`. Less than one tick
/// becomes a zero-tick, non-blocking poll.
#[cfg_attr(not(any(test, feature = "uart-esp32")), allow(dead_code))]
pub(crate) fn millis_to_ticks(timeout_ms: u32, tick_rate_hz: u32) -> u32 {
    let ticks = timeout_ms as u64 * tick_rate_hz as u64 / 1000;
    ticks.min(u32::MAX as u64) as u32
}
