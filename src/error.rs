//! Structured error types. `RenderError` and `ParseError` are the library's
//! own `thiserror` enums; the `tvg-render` binary wraps them in `eyre` at the
//! CLI boundary the same way the upstream CLI wraps library errors.

use thiserror::Error;

/// Errors the rendering core can return. Numeric edge cases (tiny arcs,
/// zero-length chords, out-of-range gradient positions) are filtered or
/// clamped rather than raised; these variants cover only the cases spec
/// treats as fatal to the offending command.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A path's flattened output exceeded the fixed-capacity scratch buffers
    /// (4096 points or 512 sub-paths).
    #[error("path exceeds flattening scratch capacity")]
    OutOfScratch,

    /// A non-finite (NaN or infinite) coordinate reached the flattener's
    /// per-point boundary check.
    #[error("non-finite coordinate in input geometry")]
    InvalidGeometry,

    /// The framebuffer rejected a pixel write.
    #[error("framebuffer write failed")]
    OutputFull,
}

/// Errors from decoding the binary TinyVG container.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("bad magic number, not a TinyVG file")]
    BadMagic,

    #[error("unsupported TinyVG version {0}")]
    UnsupportedVersion(u8),

    #[error("reserved color encoding value in header")]
    InvalidColorEncoding,

    #[error("reserved coordinate range value in header")]
    InvalidCoordinateRange,

    #[error("color index {index} out of range (table has {len} colors)")]
    BadColorIndex { index: u32, len: usize },

    #[error("unknown draw command tag {0}")]
    UnknownCommand(u8),

    #[error("unknown path command tag {0}")]
    UnknownPathCommand(u8),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// CLI usage-level errors surfaced by `tvg-render`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error("failed to read input: {0}")]
    ReadError(String),

    #[error("failed to write output: {0}")]
    WriteError(String),
}
