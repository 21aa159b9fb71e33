#[cfg(feature = "parallel")]
use rayon::prelude::*;

use tracing::debug;

use crate::alphabet::{parse_sequence, Symbol};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::grid::{gray, Rgba, RgbaImage, OPAQUE_BLACK, TRANSPARENT};
use crate::layout::{BlockPos, Layout};

/// Intensity used for symbols without a base mapping.
const UNMAPPED_INTENSITY: u8 = 0;

/// Validate `sequence` and render it with the settings in `config`.
pub fn encode(sequence: &str, config: &CodecConfig) -> Result<RgbaImage, CodecError> {
    config.validate()?;
    let symbols = parse_sequence(sequence, config.padding)?;
    encode_symbols(&symbols, &config.layout, config.transparent_padding)
}

/// Render already-validated symbols.
///
/// The image starts fully transparent when `transparent_padding` is set and
/// opaque black otherwise; block positions past the end of the sequence are
/// never written and keep that background. A [`Symbol::Padding`] inside the
/// sequence is not transparent: it is drawn opaque with the unmapped
/// intensity (0).
pub fn encode_symbols(
    symbols: &[Symbol],
    layout: &Layout,
    transparent_padding: bool,
) -> Result<RgbaImage, CodecError> {
    let geometry = layout.geometry(symbols.len())?;
    debug!(
        bases = symbols.len(),
        width = geometry.image_width,
        height = geometry.image_height,
        groups = geometry.num_groups,
        "encoding sequence"
    );

    let background = if transparent_padding {
        TRANSPARENT
    } else {
        OPAQUE_BLACK
    };
    let mut img = RgbaImage::filled(geometry.image_width, geometry.image_height, background);

    // One band is one row of blocks. Bands never overlap, so each can be
    // filled independently.
    let row_bytes = img.row_bytes();
    let band_bytes = row_bytes * layout.block_size as usize;

    #[cfg(feature = "parallel")]
    img.buf
        .par_chunks_mut(band_bytes)
        .enumerate()
        .for_each(|(abs_row, band)| fill_band(symbols, layout, row_bytes, abs_row, band));

    #[cfg(not(feature = "parallel"))]
    img.buf
        .chunks_mut(band_bytes)
        .enumerate()
        .for_each(|(abs_row, band)| fill_band(symbols, layout, row_bytes, abs_row, band));

    Ok(img)
}

/// Colour a symbol is drawn with.
pub fn quantize(symbol: Symbol) -> Rgba {
    match symbol {
        Symbol::Base(base) => gray(base.intensity()),
        Symbol::Padding => gray(UNMAPPED_INTENSITY),
    }
}

fn fill_band(symbols: &[Symbol], layout: &Layout, row_bytes: usize, abs_row: usize, band: &mut [u8]) {
    let bs = layout.block_size as usize;
    for col in 0..layout.blocks_per_row {
        let position = layout.position_of(BlockPos {
            col,
            abs_row: abs_row as u32,
        });
        let Some(&symbol) = symbols.get(position) else {
            continue;
        };
        let px = quantize(symbol);
        let x0 = col as usize * bs * 4;
        for dy in 0..bs {
            let start = dy * row_bytes + x0;
            for chunk in band[start..start + bs * 4].chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Base;
    use crate::grid::PixelGrid;

    fn small_config(block_size: u32, blocks_per_row: u32, rows_per_block: u32) -> CodecConfig {
        CodecConfig {
            layout: Layout::new(block_size, blocks_per_row, rows_per_block).unwrap(),
            ..CodecConfig::default()
        }
    }

    #[test]
    fn atcg_renders_four_quadrants() {
        let img = encode("ATCG", &small_config(2, 2, 1)).unwrap();
        assert_eq!((img.width, img.height), (4, 4));

        let quadrants = [((0, 0), 0u8), ((2, 0), 64), ((0, 2), 128), ((2, 2), 192)];
        for ((ox, oy), v) in quadrants {
            for dy in 0..2 {
                for dx in 0..2 {
                    assert_eq!(img.get_pixel(ox + dx, oy + dy), [v, v, v, 255], "({ox},{oy})+({dx},{dy})");
                }
            }
        }
    }

    #[test]
    fn width_depends_only_on_layout() {
        for len in [1usize, 7, 40, 41, 123] {
            let seq = "G".repeat(len);
            let img = encode(&seq, &small_config(3, 10, 2)).unwrap();
            assert_eq!(img.width, 30);
            assert_eq!(img.height % 3, 0);
            assert_eq!(img.buf.len(), (img.width * img.height * 4) as usize);
        }
    }

    #[test]
    fn trailing_blocks_are_transparent() {
        let img = encode("ACG", &small_config(2, 2, 1)).unwrap();
        assert_eq!(img.get_pixel(2, 2), TRANSPARENT);
        assert_eq!(img.get_pixel(3, 3), TRANSPARENT);
        assert_eq!(img.get_pixel(0, 2), gray(192));
    }

    #[test]
    fn trailing_blocks_are_opaque_black_without_transparent_padding() {
        let config = CodecConfig {
            transparent_padding: false,
            ..small_config(2, 2, 1)
        };
        let img = encode("ACG", &config).unwrap();
        assert_eq!(img.get_pixel(2, 2), OPAQUE_BLACK);
        assert_eq!(img.get_pixel(3, 3), OPAQUE_BLACK);
    }

    #[test]
    fn explicit_padding_is_drawn_opaque() {
        let img = encode("GN", &small_config(1, 2, 1)).unwrap();
        assert_eq!(img.get_pixel(1, 0), gray(UNMAPPED_INTENSITY));
    }

    #[test]
    fn tall_groups_fill_row_major() {
        // Two rows per group, three blocks per row.
        let img = encode("ATCGGA", &small_config(1, 3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        let row0: Vec<u8> = (0..3).map(|x| img.get_pixel(x, 0)[0]).collect();
        let row1: Vec<u8> = (0..3).map(|x| img.get_pixel(x, 1)[0]).collect();
        assert_eq!(row0, vec![0, 64, 128]);
        assert_eq!(row1, vec![192, 192, 0]);
    }

    #[test]
    fn rejects_invalid_symbol() {
        let err = encode("ATXG", &CodecConfig::default()).unwrap_err();
        assert_eq!(err, CodecError::InvalidSymbol { position: 2, found: 'X' });
    }

    #[test]
    fn rejects_zero_block_size() {
        let config = CodecConfig {
            layout: Layout {
                block_size: 0,
                ..Layout::default()
            },
            ..CodecConfig::default()
        };
        assert!(matches!(
            encode("A", &config),
            Err(CodecError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn encode_is_deterministic() {
        let seq = "ATCGATCGGGCCTTAA".repeat(5);
        let config = small_config(4, 7, 3);
        assert_eq!(encode(&seq, &config).unwrap(), encode(&seq, &config).unwrap());
    }

    #[test]
    fn quantize_uses_base_intensity() {
        assert_eq!(quantize(Symbol::Base(Base::C)), gray(128));
        assert_eq!(quantize(Symbol::Padding), gray(0));
    }
}
