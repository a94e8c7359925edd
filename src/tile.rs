// 8x8 tile and 128x128 page geometry.
use crate::{common::ColorRGB, image::PixelCoord, quantize::QuantizedImage};

pub const TILE_SIZE: PixelCoord = 8;
pub const PAGE_SIZE: PixelCoord = 128;
pub const TILES_PER_PAGE: usize = (PAGE_SIZE / TILE_SIZE) * (PAGE_SIZE / TILE_SIZE);

/// Top-left pixel of an 8x8 tile. Coordinates are multiples of 8.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileOrigin {
    pub x: PixelCoord,
    pub y: PixelCoord,
}

impl TileOrigin {
    pub fn new(x: PixelCoord, y: PixelCoord) -> Self {
        debug_assert!(x % TILE_SIZE == 0 && y % TILE_SIZE == 0);
        TileOrigin { x, y }
    }

    /// True if no pixel of the tile lies inside the image.
    pub fn is_outside(&self, image: &QuantizedImage) -> bool {
        self.x >= image.width() || self.y >= image.height()
    }

    /// Quantized color of each of the 64 pixels, row-major; `None` where the
    /// pixel falls outside the image.
    pub fn pixels(&self, image: &QuantizedImage) -> [[Option<ColorRGB>; 8]; 8] {
        let mut out = [[None; 8]; 8];
        for (y, row) in out.iter_mut().enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = image.get(self.x + x, self.y + y);
            }
        }
        out
    }
}

/// The non-overlapping tile grid starting at (0, 0), row by row.
pub fn tile_grid(image: &QuantizedImage) -> impl Iterator<Item = TileOrigin> {
    let (w, h) = (image.width(), image.height());
    (0..h)
        .step_by(TILE_SIZE)
        .flat_map(move |y| (0..w).step_by(TILE_SIZE).map(move |x| TileOrigin::new(x, y)))
}

/// Distinct colors present in the tile, clipped to the image, in order of
/// first appearance (row-major).
pub fn tile_colors(image: &QuantizedImage, origin: TileOrigin) -> Vec<ColorRGB> {
    let mut colors: Vec<ColorRGB> = Vec::with_capacity(4);
    for row in origin.pixels(image) {
        for c in row.into_iter().flatten() {
            if !colors.contains(&c) {
                colors.push(c);
            }
        }
    }
    colors
}
