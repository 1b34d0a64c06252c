//! Directory entry layout, 8.3 filename normalization and DOS timestamp decoding.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::Result;

/// Size of a single packed directory entry, in bytes.
pub(crate) const DIR_ENTRY_SIZE: u64 = 32;

/// First-byte marker for a deleted entry.
pub(crate) const DELETED_FLAG: u8 = 0xE5;
/// First-byte marker for end-of-directory (all remaining entries are unused).
pub(crate) const END_FLAG: u8 = 0x00;
/// FAT encodes a short name's real leading 0xE5 byte as 0x05, since 0xE5 means deleted.
const REALLY_E5_FLAG: u8 = 0x05;

bitflags::bitflags! {
    /// FAT directory entry attribute bits (§6).
    #[derive(Default)]
    pub struct FileAttributes: u8 {
        const READ_ONLY   = 0x01;
        const HIDDEN      = 0x02;
        const SYSTEM      = 0x04;
        const VOLUME_LABEL = 0x08;
        const DIRECTORY   = 0x10;
        const ARCHIVE     = 0x20;
        /// LFN entries use this exact combination of the four low bits.
        const LFN         = Self::READ_ONLY.bits | Self::HIDDEN.bits | Self::SYSTEM.bits | Self::VOLUME_LABEL.bits;
    }
}

/// A DOS-encoded date, as stored in creation/access/modify date fields.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Date {
    pub year: u16,
    pub month: u16,
    pub day: u16,
}

impl Date {
    pub(crate) fn decode(dos_date: u16) -> Self {
        Date { year: (dos_date >> 9) + 1980, month: (dos_date >> 5) & 0xF, day: dos_date & 0x1F }
    }
}

#[cfg(feature = "chrono")]
impl From<Date> for Option<chrono::NaiveDate> {
    fn from(date: Date) -> Self {
        chrono::NaiveDate::from_ymd_opt(date.year as i32, date.month as u32, date.day as u32)
    }
}

/// A DOS-encoded time of day, 2-second resolution plus a 10ms fine field.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Time {
    pub hour: u16,
    pub min: u16,
    pub sec: u16,
    pub millis: u16,
}

impl Time {
    pub(crate) fn decode(dos_time: u16, dos_time_hi_res: u8) -> Self {
        let hour = dos_time >> 11;
        let min = (dos_time >> 5) & 0x3F;
        let sec = (dos_time & 0x1F) * 2 + (dos_time_hi_res as u16) / 2;
        let millis = (dos_time_hi_res as u16 % 100) * 10;
        Time { hour, min, sec, millis }
    }
}

/// A combined DOS date and time.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

impl DateTime {
    pub(crate) fn decode(dos_date: u16, dos_time: u16, dos_time_hi_res: u8) -> Self {
        DateTime { date: Date::decode(dos_date), time: Time::decode(dos_time, dos_time_hi_res) }
    }
}

/// The raw, 32-byte on-disk directory entry record (§6).
#[derive(Clone, Debug)]
pub(crate) struct RawDirEntry {
    pub(crate) name: [u8; 11],
    pub(crate) attrs: FileAttributes,
    create_time_hi_res: u8,
    create_time: u16,
    create_date: u16,
    access_date: u16,
    first_cluster_hi: u16,
    modify_time: u16,
    modify_date: u16,
    first_cluster_lo: u16,
    pub(crate) file_size: u32,
}

impl RawDirEntry {
    pub(crate) fn deserialize(rdr: &mut &[u8]) -> Result<Self> {
        let mut name = [0u8; 11];
        rdr.read_exact(&mut name)?;
        let attrs = FileAttributes::from_bits_truncate(rdr.read_u8()?);
        let _reserved = rdr.read_u8()?;
        let create_time_hi_res = rdr.read_u8()?;
        let create_time = rdr.read_u16::<LittleEndian>()?;
        let create_date = rdr.read_u16::<LittleEndian>()?;
        let access_date = rdr.read_u16::<LittleEndian>()?;
        let first_cluster_hi = rdr.read_u16::<LittleEndian>()?;
        let modify_time = rdr.read_u16::<LittleEndian>()?;
        let modify_date = rdr.read_u16::<LittleEndian>()?;
        let first_cluster_lo = rdr.read_u16::<LittleEndian>()?;
        let file_size = rdr.read_u32::<LittleEndian>()?;
        Ok(RawDirEntry {
            name,
            attrs,
            create_time_hi_res,
            create_time,
            create_date,
            access_date,
            first_cluster_hi,
            modify_time,
            modify_date,
            first_cluster_lo,
            file_size,
        })
    }

    pub(crate) fn is_end(&self) -> bool {
        self.name[0] == END_FLAG
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.name[0] == DELETED_FLAG
    }

    pub(crate) fn is_volume_label(&self) -> bool {
        self.attrs.contains(FileAttributes::VOLUME_LABEL)
    }

    pub(crate) fn is_lfn(&self) -> bool {
        self.attrs & FileAttributes::LFN == FileAttributes::LFN
    }

    /// Attribute-only directory classification (§4.5, Open Question #2): a corrupted
    /// entry with a stray non-zero size but the directory bit set is still a directory.
    pub(crate) fn is_dir(&self) -> bool {
        self.attrs.contains(FileAttributes::DIRECTORY)
    }

    /// First data cluster, or `None` for an empty file/directory (cluster 0 means "none").
    pub(crate) fn first_cluster(&self) -> Option<u32> {
        let n = ((self.first_cluster_hi as u32) << 16) | self.first_cluster_lo as u32;
        if n == 0 {
            None
        } else {
            Some(n)
        }
    }

    pub(crate) fn created(&self) -> DateTime {
        DateTime::decode(self.create_date, self.create_time, self.create_time_hi_res)
    }

    pub(crate) fn accessed(&self) -> Date {
        Date::decode(self.access_date)
    }

    pub(crate) fn modified(&self) -> DateTime {
        DateTime::decode(self.modify_date, self.modify_time, 0)
    }
}

/// Normalizes the packed `filename[8]` + `extension[3]` pair into a display name.
///
/// Per §4.5 / Open Question #1: an all-space extension yields no trailing dot.
pub(crate) fn normalize_short_name(raw: &[u8; 11], is_dir: bool) -> String {
    let name_len = raw[0..8].iter().rposition(|&b| b != b' ').map(|p| p + 1).unwrap_or(0);
    let mut name_bytes = raw[0..name_len].to_vec();
    if let Some(first) = name_bytes.first_mut() {
        if *first == REALLY_E5_FLAG {
            *first = 0xE5;
        }
    }
    if is_dir {
        return decode_oem(&name_bytes);
    }
    let ext_len = raw[8..11].iter().rposition(|&b| b != b' ').map(|p| p + 1).unwrap_or(0);
    if ext_len == 0 {
        return decode_oem(&name_bytes);
    }
    name_bytes.push(b'.');
    name_bytes.extend_from_slice(&raw[8..8 + ext_len]);
    decode_oem(&name_bytes)
}

/// OEM code page decode: ASCII passes through, anything above 0x7F becomes U+FFFD.
/// This is the same lossy fallback the reference crate uses as its default converter.
fn decode_oem(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| if b <= 0x7F { b as char } else { '\u{FFFD}' }).collect()
}
