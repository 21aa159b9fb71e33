use crate::error::CodecError;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Block geometry shared by the encoder and the decoder.
///
/// A sequence is cut into block groups of `blocks_per_row * rows_per_block`
/// bases. Each group is a `blocks_per_row` wide, `rows_per_block` tall tile of
/// `block_size`-pixel squares, filled row-major, and groups are stacked
/// vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Layout {
    pub block_size: u32,
    pub blocks_per_row: u32,
    pub rows_per_block: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            block_size: 10,
            blocks_per_row: 40,
            rows_per_block: 1,
        }
    }
}

/// Image dimensions for a sequence of a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub image_width: u32,
    pub image_height: u32,
    pub num_groups: u32,
}

/// Block grid recovered from image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub blocks_per_row: u32,
    pub block_rows: u32,
}

impl GridShape {
    /// Number of blocks in the image.
    pub fn block_count(&self) -> usize {
        self.blocks_per_row as usize * self.block_rows as usize
    }
}

/// Location of one block, in block units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPos {
    pub col: u32,
    pub abs_row: u32,
}

impl BlockPos {
    /// Top-left pixel of the block.
    pub fn origin(&self, block_size: u32) -> (u32, u32) {
        (self.col * block_size, self.abs_row * block_size)
    }
}

impl Layout {
    pub fn new(block_size: u32, blocks_per_row: u32, rows_per_block: u32) -> Result<Self, CodecError> {
        let layout = Self {
            block_size,
            blocks_per_row,
            rows_per_block,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        check_positive("block size", self.block_size)?;
        check_positive("blocks per row", self.blocks_per_row)?;
        check_positive("rows per block", self.rows_per_block)?;
        Ok(())
    }

    /// Number of bases held by one block group.
    pub fn bases_per_group(&self) -> usize {
        self.blocks_per_row as usize * self.rows_per_block as usize
    }

    /// Compute the image size needed for `sequence_len` bases.
    pub fn geometry(&self, sequence_len: usize) -> Result<Geometry, CodecError> {
        self.validate()?;
        let num_groups = u32::try_from(sequence_len.div_ceil(self.bases_per_group()))
            .map_err(|_| overflow())?;
        let image_width = self
            .blocks_per_row
            .checked_mul(self.block_size)
            .ok_or_else(overflow)?;
        let image_height = num_groups
            .checked_mul(self.rows_per_block)
            .and_then(|rows| rows.checked_mul(self.block_size))
            .ok_or_else(overflow)?;
        Ok(Geometry {
            image_width,
            image_height,
            num_groups,
        })
    }

    /// Recover the block grid from image dimensions.
    pub fn grid_shape(width: u32, height: u32, block_size: u32) -> Result<GridShape, CodecError> {
        check_positive("block size", block_size)?;
        if width % block_size != 0 || height % block_size != 0 {
            return Err(CodecError::DimensionMismatch {
                width,
                height,
                block_size,
            });
        }
        Ok(GridShape {
            blocks_per_row: width / block_size,
            block_rows: height / block_size,
        })
    }

    /// Block holding sequence position `position`.
    pub fn block_of(&self, position: usize) -> BlockPos {
        let per_group = self.bases_per_group();
        let group = position / per_group;
        let i = position % per_group;
        let bpr = self.blocks_per_row as usize;
        let col = (i % bpr) as u32;
        let row = (i / bpr) as u32;
        BlockPos {
            col,
            abs_row: row + group as u32 * self.rows_per_block,
        }
    }

    /// Sequence position stored at a block; inverse of [`Layout::block_of`].
    pub fn position_of(&self, block: BlockPos) -> usize {
        let rpb = self.rows_per_block;
        let group = (block.abs_row / rpb) as usize;
        let row = (block.abs_row % rpb) as usize;
        group * self.bases_per_group() + row * self.blocks_per_row as usize + block.col as usize
    }
}

fn check_positive(name: &str, value: u32) -> Result<(), CodecError> {
    if value == 0 {
        return Err(CodecError::InvalidConfiguration(format!(
            "{name} must be positive"
        )));
    }
    Ok(())
}

fn overflow() -> CodecError {
    CodecError::InvalidConfiguration("image dimensions overflow".to_string())
}
