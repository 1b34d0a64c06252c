//! Volume Boot Record parsing and validation (§4.2, §6 of the on-disk layout).

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

use crate::error::{Error, Result};

const SIGNATURE: u8 = 0x29;
const END_MARKER: u16 = 0xAA55;
const VALID_SECTORS_PER_CLUSTER: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// A parsed Volume Boot Record (sector 0 of the volume).
///
/// Only the fields this driver actually needs are decoded; boot code, OEM name
/// and similar cosmetic fields are skipped over rather than stored.
#[derive(Clone, Debug)]
pub struct Vbr {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fats: u8,
    pub root_entries: u16,
    pub small_sectors: u16,
    pub sectors_per_fat: u16,
    pub large_sectors: u32,
}

impl Vbr {
    /// Parses and validates a VBR from its 512-byte sector 0 representation.
    ///
    /// Validation follows §4.2 exactly: any failed check returns `InvalidVolume`
    /// naming the failed condition.
    pub fn parse(sector: &[u8]) -> Result<Vbr> {
        if sector.len() < 512 {
            return Err(Error::InvalidArgument);
        }
        let mut rdr = sector;

        // jump instructions (3) + OEM name (8)
        skip(&mut rdr, 11)?;
        let bytes_per_sector = rdr.read_u16::<LittleEndian>()?;
        let sectors_per_cluster = rdr.read_u8()?;
        let reserved_sectors = rdr.read_u16::<LittleEndian>()?;
        let fats = rdr.read_u8()?;
        let root_entries = rdr.read_u16::<LittleEndian>()?;
        let small_sectors = rdr.read_u16::<LittleEndian>()?;
        skip(&mut rdr, 1)?; // media_type
        let sectors_per_fat = rdr.read_u16::<LittleEndian>()?;
        skip(&mut rdr, 2)?; // sectors_per_track
        skip(&mut rdr, 2)?; // heads
        skip(&mut rdr, 4)?; // hidden_sectors
        let large_sectors = rdr.read_u32::<LittleEndian>()?;
        skip(&mut rdr, 1)?; // drive_number
        skip(&mut rdr, 1)?; // reserved
        let signature = rdr.read_u8()?;
        skip(&mut rdr, 4)?; // serial_number
        skip(&mut rdr, 11)?; // volume label
        skip(&mut rdr, 8)?; // system type
        skip(&mut rdr, 448)?; // boot code
        let end_marker = rdr.read_u16::<LittleEndian>()?;

        let vbr = Vbr {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fats,
            root_entries,
            small_sectors,
            sectors_per_fat,
            large_sectors,
        };
        vbr.validate(signature, end_marker)?;
        Ok(vbr)
    }

    fn validate(&self, signature: u8, end_marker: u16) -> Result<()> {
        if self.reserved_sectors < 1 {
            return Err(Error::InvalidVolume("reserved_sectors must be >= 1"));
        }
        if self.bytes_per_sector == 0 {
            return Err(Error::InvalidVolume("bytes_per_sector must be non-zero"));
        }
        let root_dir_bytes = self.root_entries as u32 * crate::dir_entry::DIR_ENTRY_SIZE as u32;
        if root_dir_bytes % self.bytes_per_sector as u32 != 0 {
            return Err(Error::InvalidVolume("root directory is not sector-aligned"));
        }
        if self.fats < 1 {
            return Err(Error::InvalidVolume("fats must be >= 1"));
        }
        if self.sectors_per_fat < 1 {
            return Err(Error::InvalidVolume("sectors_per_fat must be >= 1"));
        }
        if signature != SIGNATURE {
            return Err(Error::InvalidVolume("bad extended boot signature"));
        }
        if (self.small_sectors == 0) == (self.large_sectors == 0) {
            return Err(Error::InvalidVolume("exactly one of small_sectors/large_sectors must be zero"));
        }
        if self.small_sectors == 0 && self.large_sectors < 65536 {
            return Err(Error::InvalidVolume("large_sectors must be >= 65536 when small_sectors is zero"));
        }
        if !VALID_SECTORS_PER_CLUSTER.contains(&self.sectors_per_cluster) {
            return Err(Error::InvalidVolume("sectors_per_cluster is not a valid power of two"));
        }
        if end_marker != END_MARKER {
            return Err(Error::InvalidVolume("missing 0xAA55 end marker"));
        }
        Ok(())
    }

    /// Total sector count of the volume, from whichever of `small_sectors`/`large_sectors` is set.
    pub fn total_sectors(&self) -> u32 {
        if self.small_sectors == 0 {
            self.large_sectors
        } else {
            self.small_sectors as u32
        }
    }

    /// Size of the root directory region in whole sectors, rounded up.
    pub fn root_dir_sectors(&self) -> u32 {
        let root_dir_bytes = self.root_entries as u32 * crate::dir_entry::DIR_ENTRY_SIZE as u32;
        (root_dir_bytes + self.bytes_per_sector as u32 - 1) / self.bytes_per_sector as u32
    }
}

fn skip(rdr: &mut impl Read, n: u64) -> Result<()> {
    std::io::copy(&mut rdr.take(n), &mut std::io::sink())?;
    Ok(())
}
