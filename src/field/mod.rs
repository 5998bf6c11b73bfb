//! Primitive field codecs for the user data block.
//!
//! Two encodings exist on disk:
//!
//! | Kind | Layout |
//! |------|--------|
//! | integer | `i32` little-endian |
//! | text | `i32` little-endian byte length, then that many GBK bytes |
//!
//! Text fields keep the raw GBK bytes they were loaded from. The bytes are
//! only replaced when a new value is set, so a field that does not decode
//! cleanly is still written back exactly as it was read.

use std::borrow::Cow;
use std::io::{Cursor, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use encoding_rs::{EncoderResult, GBK};
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field needs {needed} bytes at offset {offset:#x}, only {available} available")]
    Truncated { offset: usize, needed: usize, available: usize },
    #[error("negative text length {length} at offset {offset:#x}")]
    NegativeLength { offset: usize, length: i32 },
    #[error("character {ch:?} cannot be encoded as GBK")]
    Unmappable { ch: char },
    #[error("field `{field}` expects an integer, got {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("unknown field `{0}`")]
    UnknownField(String),
}

fn remaining(reader: &Cursor<&[u8]>) -> usize {
    reader.get_ref().len().saturating_sub(reader.position() as usize)
}

fn read_i32(reader: &mut Cursor<&[u8]>) -> Result<i32, FieldError> {
    let offset = reader.position() as usize;
    let available = remaining(reader);
    reader
        .read_i32::<LittleEndian>()
        .map_err(|_| FieldError::Truncated { offset, needed: 4, available })
}

fn put_i32(out: &mut Vec<u8>, value: i32) {
    let mut word = [0u8; 4];
    LittleEndian::write_i32(&mut word, value);
    out.extend_from_slice(&word);
}

// ── IntField ─────────────────────────────────────────────────────────────────

/// Fixed-width `i32` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntField {
    value: i32,
}

impl IntField {
    pub const ENCODED_LEN: usize = 4;

    pub fn new(value: i32) -> Self {
        Self { value }
    }

    pub fn read(reader: &mut Cursor<&[u8]>) -> Result<Self, FieldError> {
        Ok(Self::new(read_i32(reader)?))
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        put_i32(out, self.value);
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.value
    }

    #[inline]
    pub fn set(&mut self, value: i32) {
        self.value = value;
    }
}

// ── TextField ────────────────────────────────────────────────────────────────

/// Length-prefixed GBK string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    raw: Vec<u8>,
}

impl TextField {
    /// Build a field from UTF-8 text, failing on characters GBK cannot hold.
    pub fn new(value: &str) -> Result<Self, FieldError> {
        Ok(Self { raw: encode_gbk(value)? })
    }

    /// Read a length prefix and the bytes it announces. The length is
    /// checked against what is left in `reader` before anything is copied.
    pub fn read(reader: &mut Cursor<&[u8]>) -> Result<Self, FieldError> {
        let offset = reader.position() as usize;
        let length = read_i32(reader)?;
        if length < 0 {
            return Err(FieldError::NegativeLength { offset, length });
        }
        let needed = length as usize;
        let available = remaining(reader);
        let truncated = FieldError::Truncated { offset: offset + 4, needed, available };
        if needed > available {
            return Err(truncated);
        }
        let mut raw = vec![0u8; needed];
        reader.read_exact(&mut raw).map_err(|_| truncated)?;
        Ok(Self { raw })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        put_i32(out, self.raw.len() as i32);
        out.extend_from_slice(&self.raw);
    }

    pub fn encoded_len(&self) -> usize {
        4 + self.raw.len()
    }

    /// Decoded text. Malformed sequences come back as U+FFFD.
    pub fn value(&self) -> Cow<'_, str> {
        GBK.decode_without_bom_handling(&self.raw).0
    }

    /// `true` when the stored bytes are not well-formed GBK.
    pub fn is_lossy(&self) -> bool {
        GBK.decode_without_bom_handling(&self.raw).1
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Replace the value. On error the previous bytes are kept.
    pub fn set(&mut self, value: &str) -> Result<(), FieldError> {
        self.raw = encode_gbk(value)?;
        Ok(())
    }
}

/// Encode `text` as GBK without replacement characters.
pub fn encode_gbk(text: &str) -> Result<Vec<u8>, FieldError> {
    let mut encoder = GBK.new_encoder();
    let capacity = encoder
        .max_buffer_length_from_utf8_without_replacement(text.len())
        .unwrap_or(text.len() * 2);
    let mut out = Vec::with_capacity(capacity);
    let mut rest = text;
    loop {
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => return Ok(out),
            EncoderResult::Unmappable(ch) => return Err(FieldError::Unmappable { ch }),
            EncoderResult::OutputFull => out.reserve(rest.len() * 2 + 4),
        }
    }
}
