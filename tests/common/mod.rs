#![allow(dead_code)]

use byteorder::{ByteOrder, LittleEndian};
use etool::checksum;
use etool::layout::*;
use etool::ProjectInfo;

/// Opaque bytes that follow the user section in the synthetic files.
pub const TRAILER: &[u8] = b"\x00\x01\x02 resource section \xFE\xFF";

pub fn sample_info() -> ProjectInfo {
    let mut info = ProjectInfo::default();
    info.name.set("测试项目").unwrap();
    info.description.set("a small test program").unwrap();
    info.author.set("开发者").unwrap();
    info.zip_code.set("100000").unwrap();
    info.address.set("北京").unwrap();
    info.phone.set("010-12345678").unwrap();
    info.email.set("dev@example.com").unwrap();
    info.homepage.set("https://example.com").unwrap();
    info.copyright.set("版权所有").unwrap();
    info.major.set(1);
    info.minor.set(2);
    info.patch.set(3);
    info.date.set(230101);
    info
}

/// Build a well-formed project file around `info`, with a system section of
/// recognisable filler bytes and `TRAILER` after the other section marker.
pub fn build_file(info: &ProjectInfo) -> Vec<u8> {
    build_file_with_block(&info.encode())
}

/// Like [`build_file`], with `block` taken as the field block as is. Size and
/// both checksums are sealed to match it.
pub fn build_file_with_block(block: &[u8]) -> Vec<u8> {
    let mut raw: Vec<u8> = (0..USER_DATA_OFFSET).map(|i| (i * 7) as u8).collect();
    raw[..8].copy_from_slice(b"CNWTEPRG");
    raw[SYS_SECTION_OFFSET..SYS_SECTION_OFFSET + 4].copy_from_slice(&SECTION_MAGIC);
    raw[USER_SECTION_OFFSET..USER_SECTION_OFFSET + 4].copy_from_slice(&SECTION_MAGIC);

    LittleEndian::write_i32(&mut raw[DATA_SIZE_OFFSET..], block.len() as i32);
    LittleEndian::write_i32(&mut raw[DATA_CHECKSUM_OFFSET..], checksum(block));
    let head = checksum(&raw[head_range()]);
    LittleEndian::write_i32(&mut raw[HEAD_CHECKSUM_OFFSET..], head);

    raw.extend_from_slice(block);
    raw.extend_from_slice(&SECTION_MAGIC);
    raw.extend_from_slice(TRAILER);
    raw
}

pub fn sample_file() -> Vec<u8> {
    build_file(&sample_info())
}

pub fn read_i32(raw: &[u8], offset: usize) -> i32 {
    LittleEndian::read_i32(&raw[offset..])
}
