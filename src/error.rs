use core::fmt;

/// Result type returned by every fallible operation in this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Error enum with all errors that can be returned by functions from this crate.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The underlying image could not be read or seeked.
    Io(std::io::Error),
    /// A parameter was incorrect (null/empty buffer, unknown `whence`, operation on a closed handle).
    InvalidArgument,
    /// A requested file has not been found in the root directory.
    NotFound,
    /// The block device returned fewer sectors than requested.
    IoRange,
    /// The Volume Boot Record failed validation; the string names the failed check.
    InvalidVolume(&'static str),
    /// The redundant FAT copies disagree, or `FAT[1]` is not an end-of-chain marker.
    CorruptFat(&'static str),
    /// A cluster chain reached a reserved, free, or end-of-chain value before the declared file size was satisfied.
    CorruptChain,
    /// `open_file` was called on an entry with the directory attribute set.
    IsDirectory,
    /// A seek would leave `[0, size]`.
    OutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::NotFound => write!(f, "no such file"),
            Error::IoRange => write!(f, "block device returned fewer sectors than requested"),
            Error::InvalidVolume(reason) => write!(f, "invalid volume boot record: {}", reason),
            Error::CorruptFat(reason) => write!(f, "corrupt file allocation table: {}", reason),
            Error::CorruptChain => write!(f, "cluster chain is corrupt"),
            Error::IsDirectory => write!(f, "entry is a directory"),
            Error::OutOfRange => write!(f, "seek out of range"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Converts a crate error into a `std::io::Error` so `File`'s `Read`/`Seek` impls can
/// surface it through the standard traits.
impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) => io_err,
            Error::InvalidArgument => std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()),
            Error::NotFound => std::io::Error::new(std::io::ErrorKind::NotFound, err.to_string()),
            Error::IoRange => std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err.to_string()),
            Error::InvalidVolume(_) | Error::CorruptFat(_) | Error::CorruptChain => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
            }
            Error::IsDirectory => std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()),
            Error::OutOfRange => std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()),
        }
    }
}
