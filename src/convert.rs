// Whole-image conversion: quantize, build palettes, then encode every tile
// page by page.
use log::debug;

use crate::{
    chr::{encode_indices, select_palette, tile_indices, TILE_RECORD_SIZE},
    cluster::{build_palettes, PaletteSet},
    image::{PixelCoord, RgbImage},
    quantize::{ColorQuantizer, QuantizedImage},
    system_palette::SystemPalette,
    tile::{tile_colors, TileOrigin, PAGE_SIZE, TILES_PER_PAGE, TILE_SIZE},
};

pub struct Conversion {
    /// Concatenated 16-byte tile records in page order.
    pub chr: Vec<u8>,
    /// The image as rendered through the selected palettes.
    pub preview: RgbImage,
    pub palettes: PaletteSet,
}

/// Size in bytes of the CHR stream for an image of the given dimensions.
pub fn chr_size(width: PixelCoord, height: PixelCoord) -> usize {
    let pages = width.div_ceil(PAGE_SIZE) * height.div_ceil(PAGE_SIZE);
    pages * TILES_PER_PAGE * TILE_RECORD_SIZE
}

pub fn convert(image: &RgbImage, system: &SystemPalette) -> Conversion {
    let mut quantizer = ColorQuantizer::new(system);
    let quantized = quantizer.quantize(image);
    debug!(
        "Quantized {}x{} image ({} distinct input colors)",
        image.width(),
        image.height(),
        quantizer.cached_colors()
    );

    // Every tile depends on the global palette set, so it must be complete
    // before encoding starts.
    let palettes = build_palettes(&quantized, system);
    let (chr, preview) = encode_pages(&quantized, &palettes);
    Conversion {
        chr,
        preview,
        palettes,
    }
}

fn encode_pages(image: &QuantizedImage, palettes: &PaletteSet) -> (Vec<u8>, RgbImage) {
    let (width, height) = (image.width(), image.height());
    let mut chr = Vec::with_capacity(chr_size(width, height));
    let mut preview = RgbImage::new(width, height, palettes.background());

    for page_y in (0..height).step_by(PAGE_SIZE) {
        for page_x in (0..width).step_by(PAGE_SIZE) {
            debug!("Encoding page at ({}, {})", page_x, page_y);
            for tile_y in (page_y..page_y + PAGE_SIZE).step_by(TILE_SIZE) {
                for tile_x in (page_x..page_x + PAGE_SIZE).step_by(TILE_SIZE) {
                    let origin = TileOrigin::new(tile_x, tile_y);
                    if origin.is_outside(image) {
                        chr.extend_from_slice(&[0; TILE_RECORD_SIZE]);
                        continue;
                    }

                    let colors = tile_colors(image, origin);
                    let palette = palettes.get(select_palette(&colors, palettes));
                    let indices = tile_indices(image, origin, palette);
                    chr.extend_from_slice(&encode_indices(&indices));

                    for (y, row) in indices.iter().enumerate() {
                        for (x, idx) in row.iter().enumerate() {
                            if let Some(i) = idx {
                                preview.set(tile_x + x, tile_y + y, palette[*i as usize]);
                            }
                        }
                    }
                }
            }
        }
    }
    (chr, preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chr::decode_tile, common::ColorRGB};

    const K: ColorRGB = [0x00, 0x00, 0x00];
    const W: ColorRGB = [0xfc, 0xfc, 0xfc];

    #[test]
    fn size_counts_whole_pages() {
        assert_eq!(chr_size(128, 128), 4096);
        assert_eq!(chr_size(128, 256), 8192);
        assert_eq!(chr_size(64, 50), 4096);
        assert_eq!(chr_size(0, 128), 0);
    }

    #[test]
    fn short_image_is_padded_to_full_page() {
        let system = SystemPalette::nes();
        let img = RgbImage::from_fn(128, 12, |x, _| if x < 64 { K } else { W });
        let out = convert(&img, &system);
        assert_eq!(out.chr.len(), 4096);
        // Rows of tiles starting at y >= 16 lie entirely outside the image.
        assert!(out.chr[2 * 16 * TILE_RECORD_SIZE..].iter().all(|&b| b == 0));
        assert_eq!(out.preview.width(), 128);
        assert_eq!(out.preview.height(), 12);
        assert_eq!(out.preview, img);
    }

    #[test]
    fn preview_matches_decoded_indices() {
        let system = SystemPalette::nes();
        let img = RgbImage::from_fn(128, 128, |x, y| {
            [(x * 2) as u8, (y * 2) as u8, ((x ^ y) * 2) as u8]
        });
        let out = convert(&img, &system);
        let q = ColorQuantizer::new(&system).quantize(&img);
        for ty in 0..16 {
            for tx in 0..16 {
                let origin = TileOrigin::new(tx * 8, ty * 8);
                let pal_idx = select_palette(&tile_colors(&q, origin), &out.palettes);
                let palette = out.palettes.get(pal_idx);
                let start = (ty * 16 + tx) * TILE_RECORD_SIZE;
                let record: [u8; TILE_RECORD_SIZE] =
                    out.chr[start..start + TILE_RECORD_SIZE].try_into().unwrap();
                let decoded = decode_tile(&record);
                for y in 0..8 {
                    for x in 0..8 {
                        let c = out.preview.get(tx * 8 + x, ty * 8 + y).unwrap();
                        assert_eq!(c, palette[decoded[y][x] as usize]);
                    }
                }
            }
        }
    }
}
