use thiserror::Error;

/// Errors raised while identifying a ROM, building its board or restoring a
/// save state.
#[derive(Debug, Error)]
pub enum Error {
    /// The 16-byte header is missing, has the wrong signature or describes
    /// sizes that cannot be satisfied.
    #[error("invalid iNES header: {0}")]
    InvalidHeader(&'static str),
    /// Neither the catalogue nor a registered provider knows the board.
    #[error("unsupported mapper {id}")]
    UnsupportedMapper { id: u16 },
    /// A chunk overran its parent, a required chunk was absent or a field
    /// holds an impossible value. The mapper keeps its previous state.
    #[error("corrupt save state: {0}")]
    CorruptSaveState(&'static str),
    /// A backing buffer could not be allocated.
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
    /// A ROM section (trainer/PRG/CHR) is shorter than the header advertises.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The embedded ROM database blob could not be decoded.
    #[error("invalid rom database: {0}")]
    InvalidDatabase(&'static str),
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}
