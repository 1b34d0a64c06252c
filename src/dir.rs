//! Root directory traversal and lookup (§4.4, §6).

use std::io::{Read, Seek};

use crate::dir_entry::{normalize_short_name, RawDirEntry};
use crate::error::{Error, Result};
use crate::file::File;
use crate::volume::Volume;

/// A single resolved directory entry: its display name plus the decoded metadata
/// needed to classify and open it.
#[derive(Clone, Debug)]
pub struct DirEntry {
    name: String,
    raw: RawDirEntry,
}

impl DirEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.raw.is_dir()
    }

    pub fn len(&self) -> u32 {
        self.raw.file_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded creation timestamp (§6's `creation_hms`/`creation_ymd` fields).
    pub fn created(&self) -> crate::dir_entry::DateTime {
        self.raw.created()
    }

    /// Decoded last-access date (§6's `access_ymd`; FAT16 stores no access time-of-day).
    pub fn accessed(&self) -> crate::dir_entry::Date {
        self.raw.accessed()
    }

    /// Decoded last-modified timestamp (§6's `modify_hms`/`modify_ymd` fields).
    pub fn modified(&self) -> crate::dir_entry::DateTime {
        self.raw.modified()
    }
}

/// Parses a raw root-directory byte buffer into normalized entries (§4.4).
///
/// Stops at the first end-of-directory marker and filters deleted,
/// volume-label and LFN continuation records. Called once from
/// `Volume::open`; the result is cached on the `Volume` rather than
/// re-parsed on every `root_dir()` call (§2, §3: root directory is "loaded
/// with volume; immutable for reads").
pub(crate) fn parse_root_entries(bytes: &[u8]) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for chunk in bytes.chunks_exact(32) {
        let mut slice = chunk;
        let raw = RawDirEntry::deserialize(&mut slice)?;
        if raw.is_end() {
            break;
        }
        if raw.is_deleted() || raw.is_volume_label() || raw.is_lfn() {
            continue;
        }
        let name = normalize_short_name(&raw.name, raw.is_dir());
        entries.push(DirEntry { name, raw });
    }
    Ok(entries)
}

/// A view over the (fixed-size, root-only) directory region of a volume.
///
/// This driver implements §4 exactly as scoped: only the root directory is
/// walked, there is no support for opening subdirectories as directories.
/// The view itself holds no state beyond a borrow of its `Volume`; the
/// entries were already parsed and cached there at open time.
pub struct RootDir<'a, 'b: 'a, R> {
    volume: &'a Volume<'b, R>,
}

impl<'a, 'b, R: Read + Seek> RootDir<'a, 'b, R> {
    pub(crate) fn new(volume: &'a Volume<'b, R>) -> Self {
        RootDir { volume }
    }

    /// Iterates live entries in on-disk order (deleted, volume-label and LFN
    /// continuation records are already filtered out, per §4.4).
    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.volume.root_entries().iter()
    }

    /// Finds an entry by exact, case-sensitive match against its normalized name.
    ///
    /// Short names are always normalized to uppercase (§4.4), so a lowercase
    /// query will not match even though the file "is" the same one on disk.
    pub fn find(&self, name: &str) -> Option<&DirEntry> {
        self.volume.root_entries().iter().find(|e| e.name == name)
    }

    /// Opens a regular file by name for reading.
    ///
    /// Fails with `NotFound` if no such entry exists, and `IsDirectory` if the
    /// matching entry has the directory attribute set (§4.5).
    pub fn open_file(&self, name: &str) -> Result<File<'a, 'b, R>> {
        let entry = self.find(name).ok_or(Error::NotFound)?;
        if entry.is_dir() {
            return Err(Error::IsDirectory);
        }
        File::open(self.volume, entry.raw.first_cluster(), entry.raw.file_size)
    }
}
