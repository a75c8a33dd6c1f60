//! CRC-16/CCITT checksum used by the reader's frame trailer

const POLYNOMIAL: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

/// Compute the 16-bit frame checksum over `data`.
///
/// Polynomial 0x1021, initial value 0xFFFF, MSB first, with the final
/// accumulator inverted.
pub fn checksum(data: &[u8]) -> u16 {
    let crc = data.iter().fold(INIT, |mut crc, &byte| {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
        crc
    });
    !crc
}
