use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid symbol '{found}' at position {position}")]
    InvalidSymbol { position: usize, found: char },

    #[error("image dimensions ({width}x{height}) are not a multiple of block size ({block_size})")]
    DimensionMismatch {
        width: u32,
        height: u32,
        block_size: u32,
    },

    #[error(
        "pixel at ({x},{y}) for position {position}: intensity {intensity} is too far \
         from any known base intensity (min diff {min_diff})"
    )]
    UnclassifiablePixel {
        position: usize,
        x: u32,
        y: u32,
        intensity: u8,
        min_diff: u8,
    },
}
