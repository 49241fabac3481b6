//! Standard message codec with pluggable custom types
//!
//! `ReaderWriter` punya default method yang mengimplementasi standard format.
//! Extension cukup override `write_value` / `read_value_of_type` untuk tag
//! miliknya lalu delegate sisanya ke `write_standard` / `read_standard`.
//! Rekursi (isi list/map) selalu lewat `self`, jadi custom type di dalam list
//! tetap ter-encode dengan benar.

use super::encoder::{Decoder, Encoder};
use super::error::CodecError;
use super::message::ValueType;
use super::value::Value;

/// Reader/writer pair for one flavour of the standard format
pub trait ReaderWriter: Send + Sync {
    fn write_value(&self, enc: &mut Encoder, value: &Value) -> Result<(), CodecError> {
        write_standard(self, enc, value)
    }

    fn read_value_of_type(&self, tag: u8, dec: &mut Decoder<'_>) -> Result<Value, CodecError> {
        read_standard(self, tag, dec)
    }

    fn read_value(&self, dec: &mut Decoder<'_>) -> Result<Value, CodecError> {
        let tag = dec.read_u8()?;
        self.read_value_of_type(tag, dec)
    }
}

/// Base format only, no custom types
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardReaderWriter;

impl ReaderWriter for StandardReaderWriter {}

/// Encode `value` with the base rules, recursing through `rw`
pub fn write_standard<RW: ReaderWriter + ?Sized>(
    rw: &RW,
    enc: &mut Encoder,
    value: &Value,
) -> Result<(), CodecError> {
    match value {
        Value::Null => enc.write_u8(ValueType::Null as u8),
        Value::Bool(true) => enc.write_u8(ValueType::True as u8),
        Value::Bool(false) => enc.write_u8(ValueType::False as u8),
        Value::Int(v) => {
            if let Ok(small) = i32::try_from(*v) {
                enc.write_u8(ValueType::Int32 as u8);
                enc.write_i32(small);
            } else {
                enc.write_u8(ValueType::Int64 as u8);
                enc.write_i64(*v);
            }
        }
        Value::Float(v) => {
            enc.write_u8(ValueType::Float64 as u8);
            enc.write_alignment(8);
            enc.write_f64(*v);
        }
        Value::String(s) => {
            enc.write_u8(ValueType::String as u8);
            enc.write_size(s.len())?;
            enc.write_bytes(s.as_bytes());
        }
        Value::Uint8List(bytes) => {
            enc.write_u8(ValueType::Uint8List as u8);
            enc.write_size(bytes.len())?;
            enc.write_bytes(bytes);
        }
        Value::Int32List(items) => {
            enc.write_u8(ValueType::Int32List as u8);
            enc.write_size(items.len())?;
            enc.write_alignment(4);
            items.iter().for_each(|v| enc.write_i32(*v));
        }
        Value::Int64List(items) => {
            enc.write_u8(ValueType::Int64List as u8);
            enc.write_size(items.len())?;
            enc.write_alignment(8);
            items.iter().for_each(|v| enc.write_i64(*v));
        }
        Value::Float32List(items) => {
            enc.write_u8(ValueType::Float32List as u8);
            enc.write_size(items.len())?;
            enc.write_alignment(4);
            items.iter().for_each(|v| enc.write_f32(*v));
        }
        Value::Float64List(items) => {
            enc.write_u8(ValueType::Float64List as u8);
            enc.write_size(items.len())?;
            enc.write_alignment(8);
            items.iter().for_each(|v| enc.write_f64(*v));
        }
        Value::List(items) => {
            enc.write_u8(ValueType::List as u8);
            enc.write_size(items.len())?;
            for item in items {
                rw.write_value(enc, item)?;
            }
        }
        Value::Map(entries) => {
            enc.write_u8(ValueType::Map as u8);
            enc.write_size(entries.len())?;
            for (key, value) in entries {
                rw.write_value(enc, key)?;
                rw.write_value(enc, value)?;
            }
        }
        Value::Custom(custom) => return Err(CodecError::UnsupportedValue(custom.kind())),
    }
    Ok(())
}

/// Decode the body of a base-format value whose tag was already read
pub fn read_standard<RW: ReaderWriter + ?Sized>(
    rw: &RW,
    tag: u8,
    dec: &mut Decoder<'_>,
) -> Result<Value, CodecError> {
    let ty = ValueType::from_u8(tag).ok_or(CodecError::UnknownType(tag))?;

    let value = match ty {
        ValueType::Null => Value::Null,
        ValueType::True => Value::Bool(true),
        ValueType::False => Value::Bool(false),
        ValueType::Int32 => Value::Int(dec.read_i32()? as i64),
        ValueType::Int64 => Value::Int(dec.read_i64()?),
        ValueType::LargeInt => return Err(CodecError::UnknownType(tag)),
        ValueType::Float64 => {
            dec.read_alignment(8)?;
            Value::Float(dec.read_f64()?)
        }
        ValueType::String => {
            let len = dec.read_size()?;
            let bytes = dec.read_bytes(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
            Value::String(s.to_string())
        }
        ValueType::Uint8List => {
            let len = dec.read_size()?;
            Value::Uint8List(dec.read_bytes(len)?.to_vec())
        }
        ValueType::Int32List => {
            let len = dec.read_size()?;
            dec.read_alignment(4)?;
            let items = read_elements(dec, len, 4, Decoder::read_i32)?;
            Value::Int32List(items)
        }
        ValueType::Int64List => {
            let len = dec.read_size()?;
            dec.read_alignment(8)?;
            let items = read_elements(dec, len, 8, Decoder::read_i64)?;
            Value::Int64List(items)
        }
        ValueType::Float32List => {
            let len = dec.read_size()?;
            dec.read_alignment(4)?;
            let items = read_elements(dec, len, 4, Decoder::read_f32)?;
            Value::Float32List(items)
        }
        ValueType::Float64List => {
            let len = dec.read_size()?;
            dec.read_alignment(8)?;
            let items = read_elements(dec, len, 8, Decoder::read_f64)?;
            Value::Float64List(items)
        }
        ValueType::List => {
            let len = dec.read_size()?;
            // Setiap value minimal 1 byte (tag)
            let mut items = Vec::with_capacity(len.min(dec.remaining()));
            dec.enter()?;
            for _ in 0..len {
                items.push(rw.read_value(dec)?);
            }
            dec.leave();
            Value::List(items)
        }
        ValueType::Map => {
            let len = dec.read_size()?;
            let mut entries = Vec::with_capacity(len.min(dec.remaining() / 2));
            dec.enter()?;
            for _ in 0..len {
                let key = rw.read_value(dec)?;
                let value = rw.read_value(dec)?;
                entries.push((key, value));
            }
            dec.leave();
            Value::Map(entries)
        }
    };

    Ok(value)
}

fn read_elements<'a, T>(
    dec: &mut Decoder<'a>,
    len: usize,
    width: usize,
    mut read: impl FnMut(&mut Decoder<'a>) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    let needed = len.checked_mul(width).ok_or(CodecError::UnexpectedEof)?;
    if needed > dec.remaining() {
        return Err(CodecError::UnexpectedEof);
    }
    (0..len).map(|_| read(dec)).collect()
}

/// Encodes whole messages for a channel
pub trait MessageCodec: Send + Sync {
    fn encode_message(&self, message: &Value) -> Result<Vec<u8>, CodecError>;

    /// Absent or empty input decodes to `Value::Null`.
    fn decode_message(&self, message: Option<&[u8]>) -> Result<Value, CodecError>;
}

/// Standard message codec parameterised by its reader/writer
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMessageCodec<RW = StandardReaderWriter> {
    reader_writer: RW,
}

impl<RW: ReaderWriter> StandardMessageCodec<RW> {
    pub const fn new(reader_writer: RW) -> Self {
        Self { reader_writer }
    }

    pub fn reader_writer(&self) -> &RW {
        &self.reader_writer
    }

    /// Encode into a caller-owned encoder (reused across calls)
    pub fn encode_into(&self, enc: &mut Encoder, message: &Value) -> Result<(), CodecError> {
        self.reader_writer.write_value(enc, message)
    }
}

impl<RW: ReaderWriter> MessageCodec for StandardMessageCodec<RW> {
    fn encode_message(&self, message: &Value) -> Result<Vec<u8>, CodecError> {
        let mut enc = Encoder::new(64);
        self.encode_into(&mut enc, message)?;
        Ok(enc.into_bytes())
    }

    fn decode_message(&self, message: Option<&[u8]>) -> Result<Value, CodecError> {
        let bytes = match message {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(Value::Null),
        };

        let mut dec = Decoder::new(bytes);
        let value = self.reader_writer.read_value(&mut dec)?;
        if dec.remaining() > 0 {
            return Err(CodecError::TrailingBytes(dec.remaining()));
        }
        Ok(value)
    }
}
