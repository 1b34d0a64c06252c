//! Volume assembly: ties the block device, VBR, FAT and root directory together.

use std::io::{Read, Seek};

use crate::device::BlockDevice;
use crate::dir::{parse_root_entries, DirEntry, RootDir};
use crate::error::{Error, Result};
use crate::table::{copies_agree, FatTable};
use crate::vbr::Vbr;

/// The FAT variant of an opened volume.
///
/// The reference crate's `FatType` also has `Fat12`/`Fat32` variants derived
/// from the total cluster count; this driver only ever parses FAT16 volumes
/// (§1 Out of scope), so the enum is kept for API shape but has one variant.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FatType {
    Fat16,
}

/// An opened FAT16 volume.
///
/// Borrows its `BlockDevice` rather than owning it (§2), so multiple volumes
/// from different partitions of the same image can share one device, each
/// opened at its own `first_sector`.
pub struct Volume<'a, R> {
    device: &'a BlockDevice<R>,
    vbr: Vbr,
    fat: FatTable,
    /// LBA of the VBR this volume was opened from (§3's `volume_start:lba`);
    /// every other region address is derived relative to it, which is what
    /// lets `Volume::open` be pointed at a partition rather than only ever
    /// sector 0 of the image.
    volume_start: u32,
    data_first_sector: u32,
    root: Vec<DirEntry>,
}

impl<'a, R: Read + Seek> Volume<'a, R> {
    /// Opens a volume starting at `first_sector` of `device`: parses and
    /// validates the VBR, loads and cross-checks all FAT copies, and loads the
    /// root directory (§2's `open_volume` step is "load FATs + root", §4.2,
    /// §4.3, §4.4). `first_sector` is the VBR's own LBA, letting a caller that
    /// has partitioned an image open a volume anywhere in it rather than only
    /// at sector 0 (§6's `fat_open(disk, first_sector)`).
    pub fn open(device: &'a BlockDevice<R>, first_sector: u32) -> Result<Self> {
        let vbr_sector = device.read_sectors_vec(first_sector, 1)?;
        let vbr = Vbr::parse(&vbr_sector)?;

        let mut fat_copies = Vec::with_capacity(vbr.fats as usize);
        for i in 0..vbr.fats as u32 {
            let fat_first_sector = first_sector + vbr.reserved_sectors as u32 + i * vbr.sectors_per_fat as u32;
            fat_copies.push(device.read_sectors_vec(fat_first_sector, vbr.sectors_per_fat as u32)?);
        }
        if !copies_agree(&fat_copies) {
            return Err(Error::CorruptFat("redundant FAT copies do not match"));
        }
        let fat = FatTable::new(fat_copies.into_iter().next().expect("fats validated >= 1 by Vbr::parse"))?;

        let root_dir_first_sector =
            first_sector + vbr.reserved_sectors as u32 + vbr.fats as u32 * vbr.sectors_per_fat as u32;
        let data_first_sector = root_dir_first_sector + vbr.root_dir_sectors();

        let root_dir_bytes = device.read_sectors_vec(root_dir_first_sector, vbr.root_dir_sectors())?;
        let root = parse_root_entries(&root_dir_bytes)?;

        log::info!(
            "opened FAT16 volume at sector {}: {} sectors, {} clusters",
            first_sector,
            vbr.total_sectors(),
            (vbr.total_sectors() - data_first_sector) / vbr.sectors_per_cluster as u32,
        );
        log::debug!("loaded {} root directory entries", root.len());

        Ok(Volume { device, vbr, fat, volume_start: first_sector, data_first_sector, root })
    }

    /// A view over the root directory entries loaded at open time.
    pub fn root_dir<'b>(&'b self) -> RootDir<'b, 'a, R> {
        RootDir::new(self)
    }

    /// The end-of-chain marker read from `FAT[1]` at open time (§4.3).
    pub fn eoc_marker(&self) -> u16 {
        self.fat.eoc_marker()
    }

    /// This driver only ever opens FAT16 volumes; `Vbr::parse` already rejected
    /// anything whose geometry doesn't match a FAT16 layout.
    pub fn fat_type(&self) -> FatType {
        FatType::Fat16
    }

    /// LBA this volume's VBR was read from, as passed to `Volume::open`.
    pub fn volume_start(&self) -> u32 {
        self.volume_start
    }

    pub fn bytes_per_sector(&self) -> u16 {
        self.vbr.bytes_per_sector
    }

    pub fn sectors_per_cluster(&self) -> u8 {
        self.vbr.sectors_per_cluster
    }

    pub(crate) fn fat(&self) -> &FatTable {
        &self.fat
    }

    pub(crate) fn root_entries(&self) -> &[DirEntry] {
        &self.root
    }

    pub(crate) fn cluster_size_bytes(&self) -> usize {
        self.vbr.sectors_per_cluster as usize * self.vbr.bytes_per_sector as usize
    }

    fn cluster_to_sector(&self, cluster: u32) -> u32 {
        self.data_first_sector + (cluster - 2) * self.vbr.sectors_per_cluster as u32
    }

    pub(crate) fn read_cluster(&self, cluster: u32) -> Result<Vec<u8>> {
        self.device.read_sectors_vec(self.cluster_to_sector(cluster), self.vbr.sectors_per_cluster as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::build_fat16_image;
    use std::io::Cursor;

    #[test]
    fn opens_a_well_formed_volume() {
        let img = build_fat16_image(&[("A.TXT", b"hi")]);
        let device = BlockDevice::from_reader(Cursor::new(img));
        let volume = Volume::open(&device, 0).unwrap();
        assert_eq!(volume.fat_type(), FatType::Fat16);
        assert_eq!(volume.bytes_per_sector(), 512);
        assert_eq!(volume.eoc_marker(), 0xFFFF);
        assert_eq!(volume.volume_start(), 0);
    }

    #[test]
    fn rejects_mismatched_fat_copies() {
        let mut img = build_fat16_image(&[]);
        // corrupt the second FAT copy's first entry without touching copy 0.
        let second_fat_offset = (1 + 32) * 512;
        img[second_fat_offset] = 0x01;
        let device = BlockDevice::from_reader(Cursor::new(img));
        let err = Volume::open(&device, 0).unwrap_err();
        assert!(matches!(err, Error::CorruptFat(_)));
    }

    #[test]
    fn opens_a_volume_at_a_nonzero_partition_offset() {
        let img = build_fat16_image(&[("A.TXT", b"hi")]);
        let mut padded = vec![0u8; 512 * 4];
        padded.extend_from_slice(&img);
        let device = BlockDevice::from_reader(Cursor::new(padded));
        let volume = Volume::open(&device, 4).unwrap();
        assert_eq!(volume.volume_start(), 4);
        let root = volume.root_dir();
        let mut file = root.open_file("A.TXT").unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hi");
    }
}
