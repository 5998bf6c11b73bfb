//! Decoded project information: the ten text fields, the four version
//! integers, and the version strings derived from them.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use chrono::{Local, NaiveDate};

use crate::field::{FieldError, IntField, TextField};
use crate::layout::RESERVED_PADDING;

// ── FieldName ────────────────────────────────────────────────────────────────

/// Every field of the user data block, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Description,
    Author,
    ZipCode,
    Address,
    Phone,
    Fax,
    Email,
    Homepage,
    Copyright,
    Major,
    Minor,
    Patch,
    Date,
}

impl FieldName {
    pub const ALL: [FieldName; 14] = [
        FieldName::Name,
        FieldName::Description,
        FieldName::Author,
        FieldName::ZipCode,
        FieldName::Address,
        FieldName::Phone,
        FieldName::Fax,
        FieldName::Email,
        FieldName::Homepage,
        FieldName::Copyright,
        FieldName::Major,
        FieldName::Minor,
        FieldName::Patch,
        FieldName::Date,
    ];

    /// Key used in JSON documents and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            FieldName::Name        => "name",
            FieldName::Description => "description",
            FieldName::Author      => "author",
            FieldName::ZipCode     => "zipCode",
            FieldName::Address     => "address",
            FieldName::Phone       => "phone",
            FieldName::Fax         => "fax",
            FieldName::Email       => "email",
            FieldName::Homepage    => "homepage",
            FieldName::Copyright   => "copyright",
            FieldName::Major       => "major",
            FieldName::Minor       => "minor",
            FieldName::Patch       => "patch",
            FieldName::Date        => "date",
        }
    }
}

impl FromStr for FieldName {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| FieldError::UnknownField(s.to_owned()))
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A field value read by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i32),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n)  => write!(f, "{n}"),
        }
    }
}

// ── ProjectInfo ──────────────────────────────────────────────────────────────

/// The user data block of a project file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: TextField,
    pub description: TextField,
    pub author: TextField,
    pub zip_code: TextField,
    pub address: TextField,
    pub phone: TextField,
    pub fax: TextField,
    pub email: TextField,
    pub homepage: TextField,
    pub copyright: TextField,
    pub major: IntField,
    pub minor: IntField,
    pub patch: IntField,
    pub date: IntField,
}

impl ProjectInfo {
    /// Decode all fields from the start of `block`.
    ///
    /// Returns the info and the number of bytes the fields occupied (the
    /// reserved padding is not counted). On failure the field that could not
    /// be read and its offset within `block` are reported.
    pub fn decode(block: &[u8]) -> Result<(Self, usize), (FieldName, usize, FieldError)> {
        let mut info = ProjectInfo::default();
        let mut reader = Cursor::new(block);
        for name in FieldName::ALL {
            let offset = reader.position() as usize;
            let result = if let Some(slot) = info.text_slot_mut(name) {
                TextField::read(&mut reader).map(|field| *slot = field)
            } else if let Some(slot) = info.int_slot_mut(name) {
                IntField::read(&mut reader).map(|field| *slot = field)
            } else {
                Ok(())
            };
            result.map_err(|e| (name, offset, e))?;
        }
        Ok((info, reader.position() as usize))
    }

    /// Encode all fields in on-disk order, followed by the reserved padding.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for field in self.text_fields() {
            field.encode_into(&mut out);
        }
        for field in self.int_fields() {
            field.encode_into(&mut out);
        }
        out.resize(out.len() + RESERVED_PADDING, 0);
        out
    }

    pub fn encoded_len(&self) -> usize {
        self.text_fields().iter().map(|f| f.encoded_len()).sum::<usize>()
            + 4 * IntField::ENCODED_LEN
            + RESERVED_PADDING
    }

    fn text_fields(&self) -> [&TextField; 10] {
        [
            &self.name, &self.description, &self.author, &self.zip_code, &self.address,
            &self.phone, &self.fax, &self.email, &self.homepage, &self.copyright,
        ]
    }

    fn int_fields(&self) -> [&IntField; 4] {
        [&self.major, &self.minor, &self.patch, &self.date]
    }

    /// The text field behind `name`, `None` for the integer fields.
    pub fn text(&self, name: FieldName) -> Option<&TextField> {
        Some(match name {
            FieldName::Name        => &self.name,
            FieldName::Description => &self.description,
            FieldName::Author      => &self.author,
            FieldName::ZipCode     => &self.zip_code,
            FieldName::Address     => &self.address,
            FieldName::Phone       => &self.phone,
            FieldName::Fax         => &self.fax,
            FieldName::Email       => &self.email,
            FieldName::Homepage    => &self.homepage,
            FieldName::Copyright   => &self.copyright,
            _ => return None,
        })
    }

    fn text_slot_mut(&mut self, name: FieldName) -> Option<&mut TextField> {
        Some(match name {
            FieldName::Name        => &mut self.name,
            FieldName::Description => &mut self.description,
            FieldName::Author      => &mut self.author,
            FieldName::ZipCode     => &mut self.zip_code,
            FieldName::Address     => &mut self.address,
            FieldName::Phone       => &mut self.phone,
            FieldName::Fax         => &mut self.fax,
            FieldName::Email       => &mut self.email,
            FieldName::Homepage    => &mut self.homepage,
            FieldName::Copyright   => &mut self.copyright,
            _ => return None,
        })
    }

    fn int_slot_mut(&mut self, name: FieldName) -> Option<&mut IntField> {
        Some(match name {
            FieldName::Major => &mut self.major,
            FieldName::Minor => &mut self.minor,
            FieldName::Patch => &mut self.patch,
            FieldName::Date => &mut self.date,
            _ => return None,
        })
    }

    // ── By-name access ───────────────────────────────────────────────────────

    pub fn get(&self, name: FieldName) -> FieldValue {
        match name {
            FieldName::Major => FieldValue::Int(self.major.value()),
            FieldName::Minor => FieldValue::Int(self.minor.value()),
            FieldName::Patch => FieldValue::Int(self.patch.value()),
            FieldName::Date => FieldValue::Int(self.date.value()),
            _ => FieldValue::Text(self.text(name).map(|t| t.value().into_owned()).unwrap_or_default()),
        }
    }

    /// Set a field from its textual form. Integer fields require a value that
    /// parses as an integer; nothing is changed on error.
    pub fn set(&mut self, name: FieldName, value: &str) -> Result<(), FieldError> {
        if let Some(text) = self.text_slot_mut(name) {
            return text.set(value);
        }
        let parsed = parse_leading_int(value).ok_or_else(|| FieldError::InvalidInteger {
            field: name.key(),
            value: value.to_owned(),
        })?;
        if let Some(slot) = self.int_slot_mut(name) {
            slot.set(parsed);
        }
        Ok(())
    }

    // ── Version view ─────────────────────────────────────────────────────────

    /// `major.minor.patch`
    pub fn version(&self) -> String {
        format!("{}.{}.{}", self.major.value(), self.minor.value(), self.patch.value())
    }

    /// `major.minor.patch.date`
    pub fn full_version(&self) -> String {
        format!("{}.{}", self.version(), self.date.value())
    }

    /// Update the version integers from a dotted string.
    ///
    /// Components that do not parse keep their current value. A date
    /// component that is present but does not parse is replaced with
    /// today's local date as `yyMMdd`. A missing date component leaves the
    /// date alone.
    pub fn set_version(&mut self, version: &str) {
        self.set_version_on(version, Local::now().date_naive());
    }

    /// Same as [`set_version`](Self::set_version); the date component is
    /// optional in both.
    pub fn set_full_version(&mut self, version: &str) {
        self.set_version(version);
    }

    /// [`set_version`](Self::set_version) with an explicit "today".
    pub fn set_version_on(&mut self, version: &str, today: NaiveDate) {
        let mut parts = version.split('.');
        for field in [&mut self.major, &mut self.minor, &mut self.patch] {
            if let Some(n) = parts.next().and_then(parse_leading_int) {
                field.set(n);
            }
        }
        if let Some(token) = parts.next() {
            let date = parse_leading_int(token)
                .or_else(|| date_stamp(today))
                .unwrap_or(self.date.value());
            self.date.set(date);
        }
    }
}

/// `yyMMdd` as an integer, e.g. 2024-03-09 → 240309.
pub fn date_stamp(date: NaiveDate) -> Option<i32> {
    date.format("%y%m%d").to_string().parse().ok()
}

/// Parse the leading integer of `s`: surrounding whitespace, an optional sign,
/// then at least one decimal digit. Trailing garbage is ignored, values that
/// do not fit in `i32` are rejected.
pub fn parse_leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _          => ("", s),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    format!("{sign}{}", &digits[..end]).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectInfo {
        let mut info = ProjectInfo::default();
        info.name.set("示例程序").unwrap();
        info.author.set("someone").unwrap();
        info.major.set(1);
        info.minor.set(4);
        info.patch.set(7);
        info.date.set(230101);
        info
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn version_strings_are_derived() {
        let info = sample();
        assert_eq!(info.version(), "1.4.7");
        assert_eq!(info.full_version(), "1.4.7.230101");
    }

    #[test]
    fn set_version_keeps_date_without_date_token() {
        let mut info = sample();
        info.set_version_on("2.5.1", day(2026, 10, 16));
        assert_eq!((info.major.value(), info.minor.value(), info.patch.value()), (2, 5, 1));
        assert_eq!(info.date.value(), 230101);
        assert_eq!(info.full_version(), "2.5.1.230101");
    }

    #[test]
    fn set_version_skips_unparsable_component() {
        let mut info = sample();
        info.set_version_on("2.x.1", day(2026, 10, 16));
        assert_eq!(info.major.value(), 2);
        assert_eq!(info.minor.value(), 4);
        assert_eq!(info.patch.value(), 1);
    }

    #[test]
    fn set_full_version_with_date() {
        let mut info = sample();
        info.set_version_on("3.0.0.240229", day(2026, 10, 16));
        assert_eq!(info.full_version(), "3.0.0.240229");
    }

    #[test]
    fn bad_date_token_falls_back_to_today() {
        let mut info = sample();
        info.set_version_on("3.0.0.today", day(2024, 3, 9));
        assert_eq!(info.date.value(), 240309);

        let mut info = sample();
        info.set_version_on("3.0.0.", day(2026, 10, 16));
        assert_eq!(info.date.value(), 261016);
    }

    #[test]
    fn short_version_only_touches_given_parts() {
        let mut info = sample();
        info.set_version_on("9", day(2026, 10, 16));
        assert_eq!(info.full_version(), "9.4.7.230101");
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int(" 3rc1"), Some(3));
        assert_eq!(parse_leading_int("-4"), Some(-4));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999"), None);
    }

    #[test]
    fn encode_decode_preserves_every_field() {
        let mut info = sample();
        info.email.set("dev@example.com").unwrap();
        info.copyright.set("版权所有").unwrap();
        let bytes = info.encode();
        assert_eq!(bytes.len(), info.encoded_len());
        assert!(bytes[bytes.len() - RESERVED_PADDING..].iter().all(|&b| b == 0));

        let (back, used) = ProjectInfo::decode(&bytes).unwrap();
        assert_eq!(back, info);
        assert_eq!(used + RESERVED_PADDING, bytes.len());
    }

    #[test]
    fn empty_info_encoding() {
        let bytes = ProjectInfo::default().encode();
        assert_eq!(bytes.len(), 88);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_reports_failing_field() {
        let mut bytes = ProjectInfo::default().encode();
        // author length claims more than the block holds
        bytes[8..12].copy_from_slice(&1000i32.to_le_bytes());
        let (name, offset, err) = ProjectInfo::decode(&bytes).unwrap_err();
        assert_eq!(name, FieldName::Author);
        assert_eq!(offset, 8);
        assert!(matches!(err, FieldError::Truncated { needed: 1000, .. }));
    }

    #[test]
    fn each_integer_name_has_its_own_slot() {
        let mut info = ProjectInfo::default();
        for (n, name) in [FieldName::Major, FieldName::Minor, FieldName::Patch, FieldName::Date]
            .into_iter()
            .enumerate()
        {
            info.set(name, &(n + 1).to_string()).unwrap();
        }
        assert_eq!(info.full_version(), "1.2.3.4");
        assert!(info.int_slot_mut(FieldName::Name).is_none());
        assert!(info.text_slot_mut(FieldName::Date).is_none());
    }

    #[test]
    fn decode_reports_used_bytes_without_padding() {
        let info = sample();
        let mut bytes = info.encode();
        bytes.truncate(bytes.len() - RESERVED_PADDING);
        let (back, used) = ProjectInfo::decode(&bytes).unwrap();
        assert_eq!(back, info);
        assert_eq!(used, bytes.len());
    }

    #[test]
    fn by_name_access() {
        let mut info = sample();
        info.set("zipCode".parse().unwrap(), "100000").unwrap();
        info.set(FieldName::Minor, "12").unwrap();
        assert_eq!(info.get(FieldName::ZipCode), FieldValue::Text("100000".into()));
        assert_eq!(info.get(FieldName::Minor), FieldValue::Int(12));
        assert_eq!(info.get(FieldName::Name).to_string(), "示例程序");

        let err = info.set(FieldName::Patch, "abc").unwrap_err();
        assert!(matches!(err, FieldError::InvalidInteger { field: "patch", .. }));
        assert_eq!(info.patch.value(), 7);

        assert!("version".parse::<FieldName>().is_err());
    }
}
