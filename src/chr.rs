// NES CHR encoding: 8x8 tiles at 2 bits per pixel, stored as two bit planes.
use crate::{
    cluster::{Palette, PaletteSet},
    common::{nearest_index, ColorIdx, ColorRGB, PaletteIdx},
    quantize::QuantizedImage,
    tile::TileOrigin,
};

pub const TILE_RECORD_SIZE: usize = 16;

/// One encoded tile: 8 bytes of plane 0 (bit 0 of each pixel's index)
/// followed by 8 bytes of plane 1 (bit 1). Within a row byte the leftmost
/// pixel is the most significant bit.
pub type TileRecord = [u8; TILE_RECORD_SIZE];

/// Per-pixel palette indices of a tile; `None` marks pixels outside the image.
pub type TileIndices = [[Option<ColorIdx>; 8]; 8];

/// Palette covering the most of the tile's colors; the lowest index wins ties.
pub fn select_palette(tile_colors: &[ColorRGB], palettes: &PaletteSet) -> PaletteIdx {
    let mut best_idx = 0;
    let mut best_score = None;
    for (idx, pal) in palettes.palettes().iter().enumerate() {
        let score = tile_colors.iter().filter(|&c| pal.contains(c)).count();
        if best_score.map_or(true, |s| score > s) {
            best_score = Some(score);
            best_idx = idx;
        }
    }
    best_idx as PaletteIdx
}

/// Index into `palette` of the entry nearest each pixel of the tile.
pub fn tile_indices(image: &QuantizedImage, origin: TileOrigin, palette: &Palette) -> TileIndices {
    let mut out = [[None; 8]; 8];
    for (y, row) in origin.pixels(image).iter().enumerate() {
        for (x, px) in row.iter().enumerate() {
            out[y][x] = px.and_then(|c| nearest_index(c, palette)).map(|i| i as ColorIdx);
        }
    }
    out
}

pub fn encode_indices(indices: &TileIndices) -> TileRecord {
    let mut record = [0; TILE_RECORD_SIZE];
    for (y, row) in indices.iter().enumerate() {
        for (x, idx) in row.iter().enumerate() {
            // Out-of-bounds pixels take the background slot.
            let idx = idx.unwrap_or(0);
            if idx & 1 != 0 {
                record[y] |= 1 << (7 - x);
            }
            if idx & 2 != 0 {
                record[8 + y] |= 1 << (7 - x);
            }
        }
    }
    record
}

pub fn encode_tile(image: &QuantizedImage, origin: TileOrigin, palette: &Palette) -> TileRecord {
    encode_indices(&tile_indices(image, origin, palette))
}

pub fn decode_tile(record: &TileRecord) -> [[ColorIdx; 8]; 8] {
    let mut out = [[0; 8]; 8];
    for y in 0..8 {
        for x in 0..8 {
            let c0 = (record[y] >> (7 - x)) & 1;
            let c1 = (record[8 + y] >> (7 - x)) & 1;
            out[y][x] = c0 | (c1 << 1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{image::RgbImage, quantize::ColorQuantizer, system_palette::SystemPalette};

    const K: ColorRGB = [0x00, 0x00, 0x00];
    const W: ColorRGB = [0xfc, 0xfc, 0xfc];
    const R: ColorRGB = [0xf8, 0x38, 0x00];
    const G: ColorRGB = [0x00, 0xa8, 0x00];
    const U: ColorRGB = [0x00, 0x00, 0xfc];

    fn quantized(img: &RgbImage) -> QuantizedImage {
        let pal = SystemPalette::nes();
        ColorQuantizer::new(&pal).quantize(img)
    }

    #[test]
    fn selects_best_covering_palette() {
        let set = PaletteSet::new([[K, W, W, W], [K, R, G, W], [K, R, G, U], [K, U, U, U]]);
        assert_eq!(select_palette(&[R, G, U], &set), 2);
        assert_eq!(select_palette(&[R, W], &set), 1);
        // Only the background matches anywhere: first palette.
        assert_eq!(select_palette(&[K], &set), 0);
        assert_eq!(select_palette(&[], &set), 0);
        assert_eq!(select_palette(&[[1, 2, 3]], &set), 0);
    }

    #[test]
    fn plane_layout() {
        // Row 0 uses every index twice; the rest is 0.
        let palette: Palette = [K, W, R, G];
        let row = [K, W, R, G, G, R, W, K];
        let img = RgbImage::from_fn(8, 8, |x, y| if y == 0 { row[x] } else { K });
        let record = encode_tile(&quantized(&img), TileOrigin::new(0, 0), &palette);
        // indices: 0 1 2 3 3 2 1 0
        assert_eq!(record[0], 0b0101_1010);
        assert_eq!(record[8], 0b0011_1100);
        assert!(record[1..8].iter().all(|&b| b == 0));
        assert!(record[9..16].iter().all(|&b| b == 0));
        assert_eq!(decode_tile(&record)[0], [0, 1, 2, 3, 3, 2, 1, 0]);
    }

    #[test]
    fn colors_missing_from_palette_use_nearest_entry() {
        let palette: Palette = [K, W, W, R];
        // Bright grey is closest to white, found first at index 1.
        let img = RgbImage::new(8, 8, [0xbc, 0xbc, 0xbc]);
        let q = quantized(&img);
        let indices = tile_indices(&q, TileOrigin::new(0, 0), &palette);
        assert!(indices.iter().flatten().all(|&i| i == Some(1)));
        let record = encode_indices(&indices);
        assert_eq!(&record[..8], &[0xff; 8]);
        assert_eq!(&record[8..], &[0; 8]);
    }

    #[test]
    fn out_of_bounds_pixels_encode_as_zero() {
        let palette: Palette = [K, W, R, G];
        let q = quantized(&RgbImage::new(3, 2, G));
        let indices = tile_indices(&q, TileOrigin::new(0, 0), &palette);
        assert_eq!(indices[0][2], Some(3));
        assert_eq!(indices[0][3], None);
        assert_eq!(indices[2][0], None);
        let record = encode_indices(&indices);
        assert_eq!(record[0], 0b1110_0000);
        assert_eq!(record[8], 0b1110_0000);
        assert_eq!(record[1], 0b1110_0000);
        assert!(record[2..8].iter().all(|&b| b == 0));
        assert!(record[10..].iter().all(|&b| b == 0));
    }
}
