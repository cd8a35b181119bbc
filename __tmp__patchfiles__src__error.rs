//! Error types for the Mach-O patcher.
//!
//! Library code returns [`PatchError`] through [`Result`]; the CLI
//! boundary wraps these in `anyhow::Context` for user-facing messages.

use thiserror::Error;

/// Everything that can go wrong while locating, scanning, or patching
/// a Mach-O file.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too small: expected at least {expected} bytes, got {actual}")]
    FileTooSmall { expected: usize, actual: usize },

    #[error("unrecognized magic number: 0x{magic:08x}")]
    UnknownMagic { magic: u32 },

    #[error("truncated Mach-O header or load command at offset {offset}")]
    TruncatedHeader { offset: usize },

    #[error("no __TEXT,__text section found")]
    NoTextSection,

    #[error("__TEXT,__text section extends past end of mapped file")]
    TextSectionOutOfBounds,

    #[error("fat binary slice {index} (cpu_type 0x{cpu_type:08x}) extends past end of file")]
    FatSliceOutOfBounds { index: usize, cpu_type: u32 },

    #[error("too many malformed instructions in prescan ({bad} >= {limit}), bypassing patch")]
    PrescanRejected { bad: u32, limit: u32 },

    #[error("no code signature load command found, skipping signature strip")]
    NoCodeSignature,

    #[error("refusing to write output: no patches were applied")]
    NothingToWrite,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_magic_in_hex() {
        let err = PatchError::UnknownMagic { magic: 0xdeadbeef };
        assert_eq!(
            err.to_string(),
            "unrecognized magic number: 0xdeadbeef"
        );
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let err: PatchError = io_err.into();
        assert!(matches!(err, PatchError::Io(_)));
    }
}


