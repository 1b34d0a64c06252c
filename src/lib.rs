//! Read-only driver for FAT16 disk images.
//!
//! A [`BlockDevice`] wraps a sector-addressable `Read + Seek` stream. Opening a
//! [`Volume`] on top of it parses and validates the Volume Boot Record, loads
//! and cross-checks the redundant File Allocation Tables, and exposes the root
//! directory through [`RootDir`], from which regular files can be opened as
//! ordinary [`std::io::Read`] + [`std::io::Seek`] handles.
//!
//! Every handle borrows its parent rather than reference-counting it: a
//! [`Volume`] borrows the `BlockDevice` it was opened from, and a [`File`]
//! borrows the `Volume` it was opened from. The borrow checker enforces that a
//! device outlives every volume opened on it, and a volume outlives every file
//! opened on it, with no runtime bookkeeping.
//!
//! Subdirectories, writes and long filenames are out of scope; see the crate
//! design notes for the full list of non-goals.

mod device;
mod dir;
mod dir_entry;
mod error;
mod file;
mod table;
mod vbr;
mod volume;

#[cfg(test)]
mod test_util;

pub use device::{BlockDevice, SECTOR_SIZE};
pub use dir::{DirEntry, RootDir};
pub use dir_entry::{Date, DateTime, Time};
pub use error::{Error, Result};
pub use file::File;
pub use volume::{FatType, Volume};
