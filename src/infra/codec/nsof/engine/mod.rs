//! NSOF decoder and encoder.
//!
//! The decoder walks the byte stream recursively, registering aggregates in
//! the [`ObjectStream`] before their children so that `Precedent` tags inside
//! them can refer back to the enclosing object. The encoder is the mirror
//! image over [`Value`] trees: it writes aggregates in the same order the
//! decoder registers them, so `Value::Precedent` indices stay meaningful.
use alloc::{string::String, vec::Vec};

use super::{
    immediate, tag, Object, ObjectRef, ObjectStream, SlotRef, SmallRect, Value, MAX_DEPTH,
    NSOF_VERSION,
};
use crate::error::NsofError;
use crate::infra::codec::bytes::{ByteReader, ByteWriter};

//==================================================================================Decoding

/// Result of decoding a single top-level object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub stream: ObjectStream,
    pub root: ObjectRef,
    /// Bytes consumed from the input.
    pub consumed: usize,
}

impl Decoded {
    /// Owned view of the decoded root.
    pub fn value(&self) -> Result<Value, NsofError> {
        self.stream.to_value(self.root)
    }
}

/// Decode one object from the start of `buffer` (no version byte).
pub fn decode(buffer: &[u8]) -> Result<Decoded, NsofError> {
    let mut decoder = Decoder::new(buffer);
    let root = decoder.object(0)?;
    decoder.stream.add_root(root);
    Ok(Decoded {
        consumed: decoder.reader.position(),
        root,
        stream: decoder.stream,
    })
}

/// Decode consecutive objects until `buffer` is exhausted. They share one
/// precedent table.
pub fn decode_all(buffer: &[u8]) -> Result<ObjectStream, NsofError> {
    let mut decoder = Decoder::new(buffer);
    while !decoder.reader.is_empty() {
        let root = decoder.object(0)?;
        decoder.stream.add_root(root);
    }
    Ok(decoder.stream)
}

/// Decode a payload made of one or more versioned streams, as found in Dock
/// messages. Each stream restarts precedent numbering; trailing zero bytes are
/// ignored.
pub fn decode_versioned(buffer: &[u8]) -> Result<ObjectStream, NsofError> {
    let mut decoder = Decoder::new(buffer);
    while !decoder.remaining_is_padding() {
        let version = decoder.reader.read_u8()?;
        if version != NSOF_VERSION {
            return Err(NsofError::UnsupportedVersion(version));
        }
        decoder.begin_stream();
        let root = decoder.object(0)?;
        decoder.stream.add_root(root);
    }
    Ok(decoder.stream)
}

struct Decoder<'a> {
    reader: ByteReader<'a>,
    stream: ObjectStream,
    /// Registration index where the current versioned stream starts.
    base: usize,
}

impl<'a> Decoder<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(buffer),
            stream: ObjectStream::new(),
            base: 0,
        }
    }

    fn begin_stream(&mut self) {
        self.base = self.stream.registered().len();
    }

    fn remaining_is_padding(&self) -> bool {
        self.reader.rest().iter().all(|&byte| byte == 0)
    }

    fn length(&mut self) -> Result<usize, NsofError> {
        let value = self.reader.read_xlong()?;
        usize::try_from(value).map_err(|_| NsofError::InvalidLength(value))
    }

    fn object(&mut self, depth: usize) -> Result<ObjectRef, NsofError> {
        if depth > MAX_DEPTH {
            return Err(NsofError::TooDeep(MAX_DEPTH));
        }
        match self.reader.read_u8()? {
            tag::IMMEDIATE => {
                let value = self.reader.read_xlong()?;
                Ok(self.stream.register(immediate_object(value)?))
            }
            tag::CHARACTER => {
                let character = self.reader.read_u8()?;
                Ok(self.stream.push(Object::Character(u16::from(character))))
            }
            tag::UNICODE_CHARACTER => {
                let character = self.reader.read_u16_be()?;
                Ok(self.stream.push(Object::UnicodeCharacter(character)))
            }
            tag::NIL => Ok(self.stream.push(Object::Nil)),
            tag::PRECEDENT => {
                let index = self.reader.read_xlong()?;
                let registered = self.stream.registered().len() - self.base;
                usize::try_from(index)
                    .ok()
                    .filter(|&i| i < registered)
                    .and_then(|i| self.stream.precedent(self.base + i))
                    .ok_or(NsofError::PrecedentOutOfRange { index, registered })
            }
            tag::SYMBOL => {
                let len = self.length()?;
                let name = symbol_from_bytes(self.reader.read_slice(len)?);
                Ok(self.stream.register(Object::Symbol(name)))
            }
            tag::STRING => {
                let len = self.length()?;
                let text = string_from_utf16(self.reader.read_slice(len)?);
                Ok(self.stream.register(Object::String(text)))
            }
            tag::SMALL_RECT => {
                let [top, left, bottom, right] = self.reader.read_array::<4>()?;
                Ok(self.stream.register(Object::SmallRect(SmallRect {
                    top,
                    left,
                    bottom,
                    right,
                })))
            }
            tag::BINARY_OBJECT => {
                let shell = self.stream.register(Object::Nil);
                let len = self.length()?;
                let class = self.object(depth + 1)?;
                let data = self.reader.read_slice(len)?.to_vec();
                self.stream.replace(shell, Object::Binary { class, data });
                Ok(shell)
            }
            tag::ARRAY => {
                let shell = self.stream.register(Object::Nil);
                let count = self.length()?;
                let class = self.object(depth + 1)?;
                let items = self.objects(count, depth + 1)?;
                self.stream.replace(shell, Object::Array { class, items });
                Ok(shell)
            }
            tag::PLAIN_ARRAY => {
                let shell = self.stream.register(Object::Nil);
                let count = self.length()?;
                let items = self.objects(count, depth + 1)?;
                self.stream.replace(shell, Object::PlainArray(items));
                Ok(shell)
            }
            tag::FRAME => {
                let shell = self.stream.register(Object::Nil);
                let count = self.length()?;
                let keys = self.objects(count, depth + 1)?;
                let values = self.objects(count, depth + 1)?;
                let slots = keys
                    .into_iter()
                    .zip(values)
                    .map(|(key, value)| SlotRef { key, value })
                    .collect();
                self.stream.replace(shell, Object::Frame(slots));
                Ok(shell)
            }
            tag::LARGE_BINARY => Err(NsofError::UnsupportedLargeBinary),
            other => Err(NsofError::UnknownTag(other)),
        }
    }

    fn objects(&mut self, count: usize, depth: usize) -> Result<Vec<ObjectRef>, NsofError> {
        // Counts come off the wire; let the input length bound the allocation.
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(self.object(depth)?);
        }
        Ok(items)
    }
}

fn immediate_object(value: i32) -> Result<Object, NsofError> {
    if value & 0x3 == 0 {
        Ok(Object::Integer(value >> 2))
    } else if value & 0x3 == 0x3 {
        Ok(Object::MagicPointer(((value >> 4) & 0xFFFF) as u32))
    } else if value & 0xF == 0x6 {
        Ok(Object::Character(((value >> 4) & 0xFFFF) as u16))
    } else if value == immediate::TRUE {
        Ok(Object::True)
    } else if value == immediate::NIL {
        Ok(Object::Nil)
    } else {
        Err(NsofError::UnknownImmediate(value))
    }
}

/// Symbols are single-byte text; a trailing NUL is dropped.
fn symbol_from_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Strings are big-endian UTF-16 with a NUL terminator, which is dropped.
fn string_from_utf16(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    if units.last() == Some(&0) {
        units.pop();
    }
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

//==================================================================================Encoding

/// Encode `value` without a version byte.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    encode_into(value, &mut writer);
    writer.into_inner()
}

/// Encode `value` as a complete stream, version byte first.
pub fn encode_versioned(value: &Value) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u8(NSOF_VERSION);
    encode_into(value, &mut writer);
    writer.into_inner()
}

/// Append the encoding of `value` to `writer`.
pub fn encode_into(value: &Value, writer: &mut ByteWriter) {
    match value {
        Value::Integer(v) => write_immediate(writer, v.wrapping_shl(2)),
        Value::Character(c) => write_immediate(writer, (i32::from(*c) << 4) | 0x6),
        Value::True => write_immediate(writer, immediate::TRUE),
        Value::MagicPointer(p) => write_immediate(writer, (((*p & 0xFFFF) << 4) | 0x3) as i32),
        Value::Nil => writer.write_u8(tag::NIL),
        Value::UnicodeCharacter(c) => {
            writer.write_u8(tag::UNICODE_CHARACTER);
            writer.write_u16_be(*c);
        }
        Value::Symbol(name) => {
            let bytes: Vec<u8> = name
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect();
            writer.write_u8(tag::SYMBOL);
            write_length(writer, bytes.len());
            writer.write_slice(&bytes);
        }
        Value::String(text) => {
            let units: Vec<u16> = text.encode_utf16().chain(core::iter::once(0)).collect();
            writer.write_u8(tag::STRING);
            write_length(writer, units.len() * 2);
            for unit in units {
                writer.write_u16_be(unit);
            }
        }
        Value::Frame(slots) => {
            writer.write_u8(tag::FRAME);
            write_length(writer, slots.len());
            for (key, _) in slots {
                encode_into(key, writer);
            }
            for (_, slot_value) in slots {
                encode_into(slot_value, writer);
            }
        }
        Value::PlainArray(items) => {
            writer.write_u8(tag::PLAIN_ARRAY);
            write_length(writer, items.len());
            for item in items {
                encode_into(item, writer);
            }
        }
        Value::Array { class, items } => {
            writer.write_u8(tag::ARRAY);
            write_length(writer, items.len());
            encode_into(class, writer);
            for item in items {
                encode_into(item, writer);
            }
        }
        Value::SmallRect(rect) => {
            writer.write_u8(tag::SMALL_RECT);
            writer.write_slice(&[rect.top, rect.left, rect.bottom, rect.right]);
        }
        Value::Binary { class, data } => {
            writer.write_u8(tag::BINARY_OBJECT);
            write_length(writer, data.len());
            encode_into(class, writer);
            writer.write_slice(data);
        }
        Value::Precedent(index) => {
            writer.write_u8(tag::PRECEDENT);
            write_length(writer, *index);
        }
    }
}

fn write_immediate(writer: &mut ByteWriter, value: i32) {
    writer.write_u8(tag::IMMEDIATE);
    writer.write_xlong(value);
}

fn write_length(writer: &mut ByteWriter, len: usize) {
    writer.write_xlong(i32::try_from(len).unwrap_or(i32::MAX));
}
