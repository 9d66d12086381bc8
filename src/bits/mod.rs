//! Channel codec: LSB read/write over image pixels
//!
//! The only module that touches raw pixel data. Bits travel pixel-major in
//! row order, channel-major within each pixel, using exactly the first three
//! channels (RGB; alpha is never modified). Within each byte, bits are
//! embedded most-significant first.

use image::RgbaImage;

/// Channels carrying hidden bits per pixel.
pub const CHANNELS_PER_PIXEL: usize = 3;

/// Overwrite the LSB of successive channels with the bits of `data`.
///
/// Consumes one channel per bit in the fixed traversal order. If `data` is
/// shorter than the image's capacity, the remaining pixels are left
/// untouched. The caller must have verified capacity beforehand; this
/// function never writes past the last pixel.
pub fn embed_bits(image: &mut RgbaImage, data: &[u8]) {
    let total_bits = data.len() * 8;
    let mut bit_index = 0usize;

    'outer: for pixel in image.pixels_mut() {
        for channel in 0..CHANNELS_PER_PIXEL {
            if bit_index >= total_bits {
                break 'outer;
            }
            let byte = data[bit_index / 8];
            let bit = (byte >> (7 - (bit_index % 8))) & 1;
            pixel.0[channel] = (pixel.0[channel] & 0xFE) | bit;
            bit_index += 1;
        }
    }
}

/// Lazy, finite, non-restartable LSB bit reader.
///
/// Reads bits in the same order `embed_bits` writes them. The cursor only
/// moves forward; a fresh reader is needed to start over.
pub struct LsbReader<'a> {
    image: &'a RgbaImage,
    cursor: usize,
    total_bits: usize,
}

impl<'a> LsbReader<'a> {
    pub fn new(image: &'a RgbaImage) -> Self {
        let pixel_count = (image.width() as usize) * (image.height() as usize);
        Self {
            image,
            cursor: 0,
            total_bits: pixel_count * CHANNELS_PER_PIXEL,
        }
    }

    /// Bits not yet consumed.
    pub fn remaining_bits(&self) -> usize {
        self.total_bits - self.cursor
    }

    fn next_bit(&mut self) -> Option<u8> {
        if self.cursor >= self.total_bits {
            return None;
        }
        let pixel_index = (self.cursor / CHANNELS_PER_PIXEL) as u32;
        let channel = self.cursor % CHANNELS_PER_PIXEL;
        let x = pixel_index % self.image.width();
        let y = pixel_index / self.image.width();
        let value = self.image.get_pixel(x, y).0[channel] & 1;
        self.cursor += 1;
        Some(value)
    }

    /// Read `count` bytes (8 bits each, MSB first), or `None` if the image
    /// does not hold that many unread bits.
    pub fn read_bytes(&mut self, count: usize) -> Option<Vec<u8>> {
        if count * 8 > self.remaining_bits() {
            return None;
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let mut byte = 0u8;
            for _ in 0..8 {
                byte = (byte << 1) | self.next_bit()?;
            }
            out.push(byte);
        }
        Some(out)
    }

    /// Drain every remaining whole byte. Leftover bits (when the channel
    /// count is not a multiple of 8) are discarded.
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let count = self.remaining_bits() / 8;
        self.read_bytes(count).unwrap_or_default()
    }
}
