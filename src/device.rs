//! Block device — opens a disk image and serves fixed-size sector reads.
//!
//! This is the leaf component of the driver: it has no notion of FAT16 layout,
//! just "give me sector `first_sector` through `first_sector + n`".

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};

/// Size in bytes of a single sector. Fixed by the on-disk format, not negotiable.
pub const SECTOR_SIZE: usize = 512;

/// A block device backed by any `Read + Seek` stream, addressed in whole sectors.
///
/// No caching is performed: every `read_sectors` call is an independent positioned
/// read against the backing stream, matching the single shared file cursor this
/// crate's concurrency model assumes (see the crate's top-level docs).
pub struct BlockDevice<R> {
    inner: std::cell::RefCell<R>,
}

impl BlockDevice<File> {
    /// Opens a disk image file for sector-addressed reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound
            } else {
                Error::Io(err)
            }
        })?;
        log::debug!("opened disk image {:?}", path.as_ref());
        Ok(BlockDevice::from_reader(file))
    }
}

impl<R: Read + Seek> BlockDevice<R> {
    /// Wraps an already-open reader as a block device. Useful for tests, and for
    /// any caller whose stream doesn't start at sector 0 of a raw disk (a
    /// single partition read out of a larger image, say) — `Volume::open`'s
    /// `first_sector` parameter locates the volume within whatever this
    /// device serves.
    pub fn from_reader(reader: R) -> Self {
        BlockDevice { inner: std::cell::RefCell::new(reader) }
    }

    /// Reads exactly `out.len() / SECTOR_SIZE` sectors starting at `first_sector`
    /// into `out`. `out.len()` must be a non-zero multiple of `SECTOR_SIZE`.
    ///
    /// Fails with `InvalidArgument` on an empty or misaligned buffer, and with
    /// `IoRange` if fewer sectors could be read than requested (in which case
    /// the contents of `out` are undefined).
    pub fn read_sectors(&self, first_sector: u32, out: &mut [u8]) -> Result<()> {
        if out.is_empty() || out.len() % SECTOR_SIZE != 0 {
            return Err(Error::InvalidArgument);
        }
        let mut inner = self.inner.borrow_mut();
        let offset = first_sector as u64 * SECTOR_SIZE as u64;
        inner.seek(SeekFrom::Start(offset))?;
        inner.read_exact(out).map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::IoRange
            } else {
                Error::Io(err)
            }
        })?;
        log::trace!("read {} sectors at LBA {}", out.len() / SECTOR_SIZE, first_sector);
        Ok(())
    }

    /// Convenience wrapper that allocates `n` sectors worth of buffer and reads into it.
    pub fn read_sectors_vec(&self, first_sector: u32, n: u32) -> Result<Vec<u8>> {
        if n == 0 {
            return Err(Error::InvalidArgument);
        }
        let mut buf = vec![0u8; n as usize * SECTOR_SIZE];
        self.read_sectors(first_sector, &mut buf)?;
        Ok(buf)
    }
}
