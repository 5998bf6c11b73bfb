//! Fixed on-disk layout of an E language project file.
//!
//! All multi-byte integers are signed 32-bit little-endian. Offsets are
//! absolute from the start of the file.
//!
//! ```text
//! 0x000  file head identifier ("CNWTEPRG")
//! 0x008  system section marker
//! 0x0A8  user section marker
//! 0x0AC  head checksum            = checksum(bytes[0x0B0..0x10C])
//! 0x0B0  head region (92 bytes)
//! 0x0DC    data checksum          = checksum(field block)
//! 0x0E0    declared field block size
//! 0x10C  field block
//! 0x10C + size  other section marker, then opaque trailing bytes
//! ```

use std::ops::Range;

pub const SECTION_MAGIC: [u8; 4] = [0x19, 0x73, 0x11, 0x15];

pub const SYS_SECTION_OFFSET: usize = 0x08;
pub const USER_SECTION_OFFSET: usize = 0xA8;
pub const HEAD_CHECKSUM_OFFSET: usize = USER_SECTION_OFFSET + 4;
pub const USER_HEAD_OFFSET: usize = 0xB0;
pub const USER_DATA_OFFSET: usize = 0x10C;
pub const USER_HEAD_SIZE: usize = USER_DATA_OFFSET - USER_HEAD_OFFSET;
pub const DATA_CHECKSUM_OFFSET: usize = USER_HEAD_OFFSET + 44;
pub const DATA_SIZE_OFFSET: usize = USER_HEAD_OFFSET + 48;

/// Zero padding written after the last integer field.
pub const RESERVED_PADDING: usize = 0x20;

/// Smallest declared field block size that passes the size gate. An empty
/// block encodes to 88 bytes, so sizes below that still fail the later
/// consistency check.
pub const MIN_DATA_SIZE: i32 = 84;

pub const fn head_range() -> Range<usize> {
    USER_HEAD_OFFSET..USER_DATA_OFFSET
}

pub const fn data_range(size: usize) -> Range<usize> {
    USER_DATA_OFFSET..USER_DATA_OFFSET + size
}

/// Offset of the marker that closes the user section.
pub const fn other_section_offset(size: usize) -> usize {
    USER_DATA_OFFSET + size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_line_up() {
        assert_eq!(USER_HEAD_SIZE, 92);
        assert_eq!(DATA_CHECKSUM_OFFSET, 0xDC);
        assert_eq!(DATA_SIZE_OFFSET, 0xE0);
        assert_eq!(HEAD_CHECKSUM_OFFSET, 0xAC);
        assert_eq!(MIN_DATA_SIZE, 84);
    }
}
