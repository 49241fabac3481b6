//! Byte-level Encoder/Decoder
//!
//! Primitive read/write untuk standard format. Semua angka little-endian,
//! alignment dihitung relatif terhadap awal buffer.

use super::error::CodecError;
use super::message::{SIZE_U16_MARKER, SIZE_U32_MARKER};

/// Growable encoder buffer
///
/// Bisa di-`reset` dan dipakai ulang supaya kapasitas tidak dialokasi lagi.
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    /// Membuat encoder dengan kapasitas awal tertentu
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Reset encoder untuk reuse
    #[inline(always)]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    #[inline(always)]
    pub fn write_u8(&mut self, v: u8) {
        self.buffer.push(v);
    }

    #[inline(always)]
    pub fn write_u16(&mut self, v: u16) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_u32(&mut self, v: u32) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_i32(&mut self, v: i32) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_i64(&mut self, v: i64) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_f32(&mut self, v: f32) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_f64(&mut self, v: f64) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Zero padding sampai posisi kelipatan `alignment`
    #[inline]
    pub fn write_alignment(&mut self, alignment: usize) {
        let rem = self.buffer.len() % alignment;
        if rem != 0 {
            self.buffer.resize(self.buffer.len() + (alignment - rem), 0);
        }
    }

    /// Variable-length size prefix
    pub fn write_size(&mut self, size: usize) -> Result<(), CodecError> {
        if size < SIZE_U16_MARKER as usize {
            self.write_u8(size as u8);
        } else if size <= u16::MAX as usize {
            self.write_u8(SIZE_U16_MARKER);
            self.write_u16(size as u16);
        } else if size <= u32::MAX as usize {
            self.write_u8(SIZE_U32_MARKER);
            self.write_u32(size as u32);
        } else {
            return Err(CodecError::SizeOverflow(size));
        }
        Ok(())
    }

    /// Get current buffer content
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Deepest list/map/custom nesting a decoder accepts
pub const MAX_NESTING_DEPTH: usize = 64;

/// Zero-copy decoder
pub struct Decoder<'a> {
    buffer: &'a [u8],
    read_pos: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Membuat decoder dari buffer
    #[inline(always)]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            read_pos: 0,
            depth: 0,
        }
    }

    /// Masuk satu level container. Gagal di atas `MAX_NESTING_DEPTH`.
    #[inline]
    pub fn enter(&mut self) -> Result<(), CodecError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CodecError::NestingTooDeep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline(always)]
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .read_pos
            .checked_add(n)
            .ok_or(CodecError::UnexpectedEof)?;
        if end > self.buffer.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.buffer[self.read_pos..end];
        self.read_pos = end;
        Ok(bytes)
    }

    #[inline(always)]
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    #[inline(always)]
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    #[inline(always)]
    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Borrow `n` raw bytes (zero-copy)
    #[inline(always)]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        self.take(n)
    }

    /// Skip padding sampai posisi kelipatan `alignment`
    #[inline]
    pub fn read_alignment(&mut self, alignment: usize) -> Result<(), CodecError> {
        let rem = self.read_pos % alignment;
        if rem != 0 {
            self.take(alignment - rem)?;
        }
        Ok(())
    }

    pub fn read_size(&mut self) -> Result<usize, CodecError> {
        match self.read_u8()? {
            SIZE_U16_MARKER => Ok(self.read_u16()? as usize),
            SIZE_U32_MARKER => Ok(self.read_u32()? as usize),
            n => Ok(n as usize),
        }
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_prefix_widths() {
        let mut encoder = Encoder::new(16);
        encoder.write_size(253).unwrap();
        assert_eq!(encoder.as_bytes(), &[253]);

        encoder.reset();
        encoder.write_size(254).unwrap();
        assert_eq!(encoder.as_bytes(), &[254, 254, 0]);

        encoder.reset();
        encoder.write_size(0x1_0000).unwrap();
        assert_eq!(encoder.as_bytes(), &[255, 0, 0, 1, 0]);

        let mut decoder = Decoder::new(encoder.as_bytes());
        assert_eq!(decoder.read_size().unwrap(), 0x1_0000);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_alignment_is_relative_to_buffer_start() {
        let mut encoder = Encoder::new(16);
        encoder.write_u8(6);
        encoder.write_alignment(8);
        assert_eq!(encoder.len(), 8);
        encoder.write_f64(1.5);

        let mut decoder = Decoder::new(encoder.as_bytes());
        assert_eq!(decoder.read_u8().unwrap(), 6);
        decoder.read_alignment(8).unwrap();
        assert_eq!(decoder.read_f64().unwrap(), 1.5);
    }

    #[test]
    fn test_truncated_read() {
        let mut decoder = Decoder::new(&[1, 2]);
        assert_eq!(decoder.read_u32(), Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn test_encoder_reuse() {
        let mut encoder = Encoder::new(8);
        encoder.write_u32(7);
        encoder.reset();
        encoder.write_u8(9);
        assert_eq!(encoder.as_bytes(), &[9]);
    }
}
