//! Common test utilities and raw image builders

#![allow(dead_code, unused_imports)]

pub mod builder;
pub use builder::ImageBuilder;

/// Known-good image with vendor info and GPIO map atoms
pub const SAMPLE: &[u8] = include_bytes!("../files/sample.eep");

/// Known-good image with vendor info, GPIO map, device tree and custom atoms
pub const SPIDEV: &[u8] = include_bytes!("../files/spidev.eep");

/// Byte ranges of each atom frame in a raw image, found by walking the
/// length fields
pub fn atom_spans(data: &[u8]) -> Vec<std::ops::Range<usize>> {
    let count = u16::from_le_bytes([data[6], data[7]]) as usize;
    let mut spans = Vec::with_capacity(count);
    let mut pos = 12;
    for _ in 0..count {
        let len = u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]]);
        let end = pos + 8 + len as usize;
        spans.push(pos..end);
        pos = end;
    }
    spans
}
