use tracing::debug;

use crate::alphabet::{Base, BASES};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::grid::{PixelGrid, Rgba};
use crate::layout::{BlockPos, Layout};

/// Pixels with alpha below this value are read as padding.
pub const OPACITY_THRESHOLD: u8 = 128;

/// Reads a block image back into a base sequence.
///
/// Each block is represented by its top-left pixel only. This relies on the
/// uniform fill the encoder writes; images whose blocks are not uniform
/// (resampled, lossy re-encoded) may decode wrongly without an error.
#[derive(Debug, Clone)]
pub struct Decoder {
    block_size: u32,
    rows_per_block: u32,
    tolerance: u8,
    padding: char,
}

impl Decoder {
    pub fn new(
        block_size: u32,
        rows_per_block: u32,
        tolerance: u8,
        padding: char,
    ) -> Result<Self, CodecError> {
        CodecConfig {
            layout: Layout {
                block_size,
                rows_per_block,
                ..Layout::default()
            },
            padding,
            tolerance,
            ..CodecConfig::default()
        }
        .validate()?;
        Ok(Self {
            block_size,
            rows_per_block,
            tolerance,
            padding,
        })
    }

    /// Build a decoder from a codec config. `blocks_per_row` is ignored; the
    /// decoder takes it from the image width.
    pub fn from_config(config: &CodecConfig) -> Result<Self, CodecError> {
        Self::new(
            config.layout.block_size,
            config.layout.rows_per_block,
            config.tolerance,
            config.padding,
        )
    }

    /// Decode every block of `grid`, in sequence order.
    ///
    /// The result has one character per block, trailing padding included.
    /// The first pixel that cannot be classified aborts the whole decode.
    pub fn decode<G: PixelGrid + ?Sized>(&self, grid: &G) -> Result<String, CodecError> {
        let shape = Layout::grid_shape(grid.width(), grid.height(), self.block_size)?;
        debug!(
            blocks_per_row = shape.blocks_per_row,
            block_rows = shape.block_rows,
            "decoding image"
        );
        if shape.block_count() == 0 {
            return Ok(String::new());
        }

        let layout = Layout {
            block_size: self.block_size,
            blocks_per_row: shape.blocks_per_row,
            rows_per_block: self.rows_per_block,
        };
        // Groups are whole block rows filled row-major, so sequence order is
        // raster order over blocks: position = abs_row * blocks_per_row + col.
        let mut out = String::with_capacity(shape.block_count());
        let mut padded = 0usize;
        let mut position = 0usize;
        for abs_row in 0..shape.block_rows {
            for col in 0..shape.blocks_per_row {
                let block = BlockPos { col, abs_row };
                debug_assert_eq!(layout.position_of(block), position);
                let (x, y) = block.origin(self.block_size);
                let px = grid.get_pixel(x, y);
                if px[3] < OPACITY_THRESHOLD {
                    out.push(self.padding);
                    padded += 1;
                } else {
                    let intensity = intensity(px);
                    let (base, min_diff) = nearest_base(intensity);
                    if min_diff > self.tolerance {
                        return Err(CodecError::UnclassifiablePixel {
                            position,
                            x,
                            y,
                            intensity,
                            min_diff,
                        });
                    }
                    out.push(base.as_char());
                }
                position += 1;
            }
        }

        debug!(symbols = shape.block_count(), padded, "decoded image");
        Ok(out)
    }
}

/// Decode `grid` with the settings in `config`.
pub fn decode<G: PixelGrid + ?Sized>(grid: &G, config: &CodecConfig) -> Result<String, CodecError> {
    Decoder::from_config(config)?.decode(grid)
}

/// Equal-weight grayscale value of a pixel, rounded to nearest.
pub fn intensity(px: Rgba) -> u8 {
    let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
    ((sum + 1) / 3) as u8
}

/// Closest base to `intensity` and its distance.
///
/// Bases are scanned in declared order and only a strictly smaller
/// distance replaces the current best, so ties go to the earlier base.
pub fn nearest_base(intensity: u8) -> (Base, u8) {
    let mut best = BASES[0];
    let mut best_diff = intensity.abs_diff(best.intensity());
    for &base in &BASES[1..] {
        let diff = intensity.abs_diff(base.intensity());
        if diff < best_diff {
            best = base;
            best_diff = diff;
        }
    }
    (best, best_diff)
}

/// Drop trailing padding characters from a decoded sequence.
pub fn strip_padding(sequence: &str, padding: char) -> &str {
    sequence.trim_end_matches(padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{gray, RgbaImage};

    fn single_block(px: Rgba) -> RgbaImage {
        RgbaImage::filled(2, 2, px)
    }

    fn decoder(tolerance: u8) -> Decoder {
        Decoder::new(2, 1, tolerance, 'N').unwrap()
    }

    #[test]
    fn intensity_rounds_to_nearest() {
        assert_eq!(intensity([10, 10, 10, 255]), 10);
        assert_eq!(intensity([10, 10, 11, 255]), 10);
        assert_eq!(intensity([10, 11, 11, 255]), 11);
        assert_eq!(intensity([255, 255, 255, 255]), 255);
    }

    #[test]
    fn nearest_base_picks_closest() {
        assert_eq!(nearest_base(0), (Base::A, 0));
        assert_eq!(nearest_base(70), (Base::T, 6));
        assert_eq!(nearest_base(120), (Base::C, 8));
        assert_eq!(nearest_base(255), (Base::G, 63));
    }

    #[test]
    fn ties_go_to_earlier_base() {
        assert_eq!(nearest_base(32), (Base::A, 32));
        assert_eq!(nearest_base(96), (Base::T, 32));
        assert_eq!(nearest_base(160), (Base::C, 32));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let d = decoder(20);
        assert_eq!(d.decode(&single_block(gray(64 + 20))).unwrap(), "T");
        assert_eq!(d.decode(&single_block(gray(64 - 20))).unwrap(), "T");
        assert_eq!(d.decode(&single_block(gray(192 + 20))).unwrap(), "G");
        assert_eq!(d.decode(&single_block(gray(192 - 20))).unwrap(), "G");
    }

    #[test]
    fn one_past_tolerance_fails() {
        let d = decoder(20);
        let err = d.decode(&single_block(gray(192 + 21))).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnclassifiablePixel {
                position: 0,
                x: 0,
                y: 0,
                intensity: 213,
                min_diff: 21
            }
        );
        assert!(d.decode(&single_block(gray(64 - 21))).is_err());
    }

    #[test]
    fn low_alpha_is_padding_regardless_of_colour() {
        let d = decoder(20);
        assert_eq!(d.decode(&single_block([250, 3, 99, 127])).unwrap(), "N");
        assert_eq!(d.decode(&single_block([0, 0, 0, 0])).unwrap(), "N");
        assert_eq!(d.decode(&single_block([64, 64, 64, 128])).unwrap(), "T");
    }

    #[test]
    fn samples_only_top_left_pixel() {
        let mut img = RgbaImage::filled(2, 2, gray(128));
        img.set_pixel(1, 1, [255, 0, 0, 255]);
        assert_eq!(decoder(20).decode(&img).unwrap(), "C");
    }

    #[test]
    fn rejects_dimensions_off_block_grid() {
        let img = RgbaImage::new(95, 100);
        let d = Decoder::new(10, 1, 20, 'N').unwrap();
        assert_eq!(
            d.decode(&img).unwrap_err(),
            CodecError::DimensionMismatch {
                width: 95,
                height: 100,
                block_size: 10
            }
        );
    }

    #[test]
    fn error_position_counts_emitted_symbols() {
        let mut img = RgbaImage::filled(3, 1, gray(0));
        img.set_pixel(2, 0, gray(100));
        let d = Decoder::new(1, 1, 20, 'N').unwrap();
        assert!(matches!(
            d.decode(&img),
            Err(CodecError::UnclassifiablePixel { position: 2, x: 2, y: 0, .. })
        ));
    }

    #[test]
    fn partial_last_group_is_decoded() {
        // Three block rows with two rows per group: the second group has one row.
        let mut img = RgbaImage::filled(2, 3, gray(0));
        img.set_pixel(0, 2, gray(192));
        img.set_pixel(1, 2, gray(128));
        let d = Decoder::new(1, 2, 20, 'N').unwrap();
        assert_eq!(d.decode(&img).unwrap(), "AAAAGC");
    }

    #[test]
    fn decode_cost_follows_image_not_rows_per_block() {
        let mut img = RgbaImage::filled(40, 1, gray(0));
        img.set_pixel(39, 0, gray(192));
        let d = Decoder::new(1, u32::MAX, 20, 'N').unwrap();
        let decoded = d.decode(&img).unwrap();
        assert_eq!(decoded.len(), 40);
        assert_eq!(decoded, format!("{}G", "A".repeat(39)));
    }

    #[test]
    fn empty_image_decodes_to_empty_sequence() {
        let img = RgbaImage::new(0, 0);
        assert_eq!(decoder(20).decode(&img).unwrap(), "");
    }

    #[test]
    fn new_rejects_zero_rows_per_block() {
        assert!(Decoder::new(10, 0, 20, 'N').is_err());
    }

    #[test]
    fn strip_padding_only_trims_the_end() {
        assert_eq!(strip_padding("ANTNN", 'N'), "ANT");
        assert_eq!(strip_padding("NNN", 'N'), "");
    }
}
