//! Checksum calculations for atom validation
//!
//! HAT atoms carry a CRC-16/ARC: polynomial 0x8005 processed
//! least-significant bit first (0xA001 reflected), initial value zero,
//! no final XOR. This is what the `eepmake`/`eepdump` tools and the
//! firmware bootloader compute.

/// Reflected CRC-16 polynomial
const POLY_REFLECTED: u16 = 0xA001;

/// Byte-wise lookup table, built at compile time
static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLY_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Calculate the CRC-16 of a byte sequence
pub fn checksum(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        (crc >> 8) ^ TABLE[((crc ^ byte as u16) & 0xFF) as usize]
    })
}

/// Verify that a byte sequence has the given CRC-16
pub fn verify_checksum(data: &[u8], expected: u16) -> bool {
    checksum(data) == expected
}
