//! Loading and saving whole project files.
//!
//! ```no_run
//! use etool::ELangFile;
//!
//! let mut file = ELangFile::open("project.e")?;
//! file.info_mut().author.set("someone")?;
//! file.info_mut().set_version("1.2.0");
//! file.save_to("project.e")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Validation order
//! `load` runs each gate in turn and stops at the first failure:
//!
//! 1. system section marker
//! 2. user section marker
//! 3. declared field block size (at least [`MIN_DATA_SIZE`])
//! 4. head checksum
//! 5. data checksum
//! 6. field decoding
//! 7. declared size equals the decoded fields plus the reserved padding
//! 8. other section marker after the field block
//!
//! Nothing is returned for a file that fails any gate.

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use thiserror::Error;
use tracing::{debug, warn};

use crate::checksum::checksum;
use crate::field::FieldError;
use crate::layout::*;
use crate::project::{FieldName, ProjectInfo};

// ── Error type ───────────────────────────────────────────────────────────────

/// Broad class of a [`ContainerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing marker, bad size, or a buffer too short for the layout.
    Structural,
    /// Head or data checksum mismatch.
    Integrity,
    /// A field could not be decoded.
    Decoding,
    Io,
}

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("file too short: {needed} bytes needed, {actual} present")]
    Truncated { needed: usize, actual: usize },
    #[error("system section flag error at {offset:#x}: found {found}")]
    SystemSectionFlag { offset: usize, found: String },
    #[error("user section flag error at {offset:#x}: found {found}")]
    UserSectionFlag { offset: usize, found: String },
    #[error("user data size error: declared {size}, minimum {min}", min = MIN_DATA_SIZE)]
    UserDataSize { size: i32 },
    #[error("user data size error: declared {declared}, fields and padding take {encoded}")]
    DataSizeMismatch { declared: usize, encoded: usize },
    #[error("user head hash error: stored {expected:#010x}, computed {actual:#010x}")]
    HeadChecksum { expected: i32, actual: i32 },
    #[error("user data hash error: stored {expected:#010x}, computed {actual:#010x}")]
    DataChecksum { expected: i32, actual: i32 },
    #[error("field `{field}` at {offset:#x}: {source}")]
    Field {
        field: FieldName,
        offset: usize,
        #[source]
        source: FieldError,
    },
    #[error("other section flag error at {offset:#x}: found {found}")]
    OtherSectionFlag { offset: usize, found: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ContainerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContainerError::Truncated { .. }
            | ContainerError::SystemSectionFlag { .. }
            | ContainerError::UserSectionFlag { .. }
            | ContainerError::UserDataSize { .. }
            | ContainerError::DataSizeMismatch { .. }
            | ContainerError::OtherSectionFlag { .. } => ErrorKind::Structural,
            ContainerError::HeadChecksum { .. } | ContainerError::DataChecksum { .. } => {
                ErrorKind::Integrity
            }
            ContainerError::Field { .. } => ErrorKind::Decoding,
            ContainerError::Io(_) => ErrorKind::Io,
        }
    }
}

fn require_len(bytes: &[u8], needed: usize) -> Result<(), ContainerError> {
    if bytes.len() < needed {
        return Err(ContainerError::Truncated { needed, actual: bytes.len() });
    }
    Ok(())
}

fn read_word(bytes: &[u8], offset: usize) -> Result<i32, ContainerError> {
    let mut reader = Cursor::new(bytes);
    reader.set_position(offset as u64);
    reader
        .read_i32::<LittleEndian>()
        .map_err(|_| ContainerError::Truncated { needed: offset + 4, actual: bytes.len() })
}

/// `None` when the marker is present, otherwise the bytes found there as hex.
fn check_marker(bytes: &[u8], offset: usize) -> Option<String> {
    let found = &bytes[offset..offset + SECTION_MAGIC.len()];
    (found != SECTION_MAGIC).then(|| hex::encode(found))
}

// ── ELangFile ────────────────────────────────────────────────────────────────

/// A loaded project file. Everything outside the field block is written
/// back verbatim by [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct ELangFile {
    raw: Vec<u8>,
    data_size: usize,
    info: ProjectInfo,
}

impl ELangFile {
    // ── Constructors ─────────────────────────────────────────────────────────

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening project file");
        Self::load(fs::read(path)?)
    }

    /// Validate and decode `raw`.
    pub fn load(raw: Vec<u8>) -> Result<Self, ContainerError> {
        require_len(&raw, USER_DATA_OFFSET)?;

        if let Some(found) = check_marker(&raw, SYS_SECTION_OFFSET) {
            return Err(ContainerError::SystemSectionFlag { offset: SYS_SECTION_OFFSET, found });
        }
        if let Some(found) = check_marker(&raw, USER_SECTION_OFFSET) {
            return Err(ContainerError::UserSectionFlag { offset: USER_SECTION_OFFSET, found });
        }

        let size = read_word(&raw, DATA_SIZE_OFFSET)?;
        if size < MIN_DATA_SIZE {
            return Err(ContainerError::UserDataSize { size });
        }
        let data_size = size as usize;
        require_len(&raw, other_section_offset(data_size) + SECTION_MAGIC.len())?;
        debug!(data_size, "section markers ok");

        let expected = read_word(&raw, HEAD_CHECKSUM_OFFSET)?;
        let actual = checksum(&raw[head_range()]);
        if expected != actual {
            return Err(ContainerError::HeadChecksum { expected, actual });
        }

        let block = &raw[data_range(data_size)];
        let expected = read_word(&raw, DATA_CHECKSUM_OFFSET)?;
        let actual = checksum(block);
        if expected != actual {
            return Err(ContainerError::DataChecksum { expected, actual });
        }

        let (info, used) = ProjectInfo::decode(block).map_err(|(field, offset, source)| {
            ContainerError::Field { field, offset: USER_DATA_OFFSET + offset, source }
        })?;
        // save() rebuilds the block from the fields alone
        let encoded = used + RESERVED_PADDING;
        if encoded != data_size {
            return Err(ContainerError::DataSizeMismatch { declared: data_size, encoded });
        }

        let other = other_section_offset(data_size);
        if let Some(found) = check_marker(&raw, other) {
            return Err(ContainerError::OtherSectionFlag { offset: other, found });
        }

        for name in FieldName::ALL {
            if info.text(name).is_some_and(|f| f.is_lossy()) {
                warn!(field = %name, "text is not valid GBK; raw bytes kept");
            }
        }
        debug!(version = %info.full_version(), trailing = raw.len() - other, "project file loaded");

        Ok(Self { raw, data_size, info })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn info(&self) -> &ProjectInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ProjectInfo {
        &mut self.info
    }

    /// Everything from the other section marker to the end of the file.
    pub fn trailing(&self) -> &[u8] {
        &self.raw[other_section_offset(self.data_size)..]
    }

    /// The bytes this file was loaded from.
    pub fn original(&self) -> &[u8] {
        &self.raw
    }

    // ── Save ─────────────────────────────────────────────────────────────────

    /// Re-encode the field block and rebuild the file around it.
    ///
    /// The size and data checksum are written into the head region first,
    /// so the head checksum covers their new values.
    pub fn save(&self) -> Vec<u8> {
        let block = self.info.encode();
        let trailing = self.trailing();

        let mut out = Vec::with_capacity(USER_DATA_OFFSET + block.len() + trailing.len());
        out.extend_from_slice(&self.raw[..USER_DATA_OFFSET]);
        LittleEndian::write_i32(&mut out[DATA_SIZE_OFFSET..], block.len() as i32);
        LittleEndian::write_i32(&mut out[DATA_CHECKSUM_OFFSET..], checksum(&block));
        let head = checksum(&out[head_range()]);
        LittleEndian::write_i32(&mut out[HEAD_CHECKSUM_OFFSET..], head);

        out.extend_from_slice(&block);
        out.extend_from_slice(trailing);
        debug!(data_size = block.len(), total = out.len(), "project file encoded");
        out
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.save())
    }
}
