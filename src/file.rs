//! Read-only file handle: cluster-chain-backed `Read` + `Seek` (§4.6, §4.7).

use std::io::{Read, Seek, SeekFrom};

use crate::error::Error;
use crate::volume::Volume;

/// An open handle to a regular file's contents.
///
/// The handle borrows its `Volume` for its whole lifetime (§2: ownership is
/// expressed through borrowing, not a runtime open-handle counter). The full
/// cluster chain is resolved once at open time; `Read`/`Seek` only ever
/// translate a byte position into a `(cluster, offset)` pair.
pub struct File<'a, 'b: 'a, R> {
    volume: &'a Volume<'b, R>,
    clusters: Vec<u32>,
    size: u32,
    pos: u64,
}

impl<'a, 'b, R: Read + Seek> File<'a, 'b, R> {
    pub(crate) fn open(volume: &'a Volume<'b, R>, first_cluster: Option<u32>, size: u32) -> crate::error::Result<Self> {
        let clusters = match first_cluster {
            Some(start) if size > 0 => volume.fat().iter_chain(start).collect::<crate::error::Result<Vec<u32>>>()?,
            _ => Vec::new(),
        };
        Ok(File { volume, clusters, size, pos: 0 })
    }

    /// Total length of the file in bytes, as recorded in its directory entry.
    pub fn len(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Closes the handle. A no-op beyond consuming `self`: all cleanup happens
    /// through normal `Drop`, there is no flush-on-close state to release for a
    /// read-only driver.
    pub fn close(self) {}
}

impl<'a, 'b, R: Read + Seek> Read for File<'a, 'b, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.size as u64 - self.pos;
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let cluster_bytes = self.volume.cluster_size_bytes() as u64;
        let cluster_idx = (self.pos / cluster_bytes) as usize;
        let offset_in_cluster = (self.pos % cluster_bytes) as usize;
        let cluster = *self.clusters.get(cluster_idx).ok_or(Error::CorruptChain)?;
        let cluster_data = self.volume.read_cluster(cluster)?;

        let avail_in_cluster = cluster_data.len() - offset_in_cluster;
        let to_read = (buf.len() as u64).min(remaining).min(avail_in_cluster as u64) as usize;
        buf[..to_read].copy_from_slice(&cluster_data[offset_in_cluster..offset_in_cluster + to_read]);
        self.pos += to_read as u64;
        Ok(to_read)
    }
}

impl<'a, 'b, R: Read + Seek> Seek for File<'a, 'b, R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::End(n) => self.size as i64 + n,
            SeekFrom::Current(n) => self.pos as i64 + n,
        };
        if new_pos < 0 || new_pos as u64 > self.size as u64 {
            return Err(Error::OutOfRange.into());
        }
        self.pos = new_pos as u64;
        Ok(self.pos)
    }
}
