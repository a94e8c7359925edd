// Mapping of raw RGB pixels onto the system palette.
use hashbrown::HashMap;

use crate::{
    common::ColorRGB,
    image::{PixelCoord, RgbImage},
    system_palette::SystemPalette,
};

/// An image whose every pixel is a system palette entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantizedImage(RgbImage);

impl QuantizedImage {
    pub fn width(&self) -> PixelCoord {
        self.0.width()
    }

    pub fn height(&self) -> PixelCoord {
        self.0.height()
    }

    pub fn get(&self, x: PixelCoord, y: PixelCoord) -> Option<ColorRGB> {
        self.0.get(x, y)
    }
}

/// Nearest-color lookup with a cache keyed by the raw input color. One
/// quantizer is meant to live for a single conversion.
pub struct ColorQuantizer<'a> {
    palette: &'a SystemPalette,
    cache: HashMap<ColorRGB, ColorRGB>,
}

impl<'a> ColorQuantizer<'a> {
    pub fn new(palette: &'a SystemPalette) -> Self {
        ColorQuantizer {
            palette,
            cache: HashMap::new(),
        }
    }

    pub fn quantize_color(&mut self, c: ColorRGB) -> ColorRGB {
        let palette = self.palette;
        *self.cache.entry(c).or_insert_with(|| palette.nearest(c))
    }

    pub fn quantize(&mut self, image: &RgbImage) -> QuantizedImage {
        let out = RgbImage::from_fn(image.width(), image.height(), |x, y| {
            // from_fn only visits in-bounds coordinates
            let c = image.get(x, y).unwrap_or_default();
            self.quantize_color(c)
        });
        QuantizedImage(out)
    }

    pub fn cached_colors(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::color_distance;

    #[test]
    fn every_pixel_is_nearest_system_color() {
        let pal = SystemPalette::nes();
        let img = RgbImage::from_fn(37, 21, |x, y| {
            [(x * 7) as u8, (y * 12) as u8, ((x + y) * 5) as u8]
        });
        let mut quantizer = ColorQuantizer::new(&pal);
        let q = quantizer.quantize(&img);
        assert_eq!(q.width(), 37);
        assert_eq!(q.height(), 21);
        for y in 0..21 {
            for x in 0..37 {
                let raw = img.get(x, y).unwrap();
                let got = q.get(x, y).unwrap();
                assert!(pal.contains(got));
                let best = pal
                    .colors()
                    .iter()
                    .map(|&c| color_distance(raw, c))
                    .min()
                    .unwrap();
                assert_eq!(color_distance(raw, got), best);
                let first = pal
                    .colors()
                    .iter()
                    .find(|&&c| color_distance(raw, c) == best)
                    .unwrap();
                assert_eq!(got, *first);
            }
        }
    }

    #[test]
    fn cache_holds_one_entry_per_distinct_color() {
        let pal = SystemPalette::nes();
        let img = RgbImage::from_fn(16, 16, |x, _| if x < 8 { [1, 2, 3] } else { [250, 0, 0] });
        let mut quantizer = ColorQuantizer::new(&pal);
        quantizer.quantize(&img);
        assert_eq!(quantizer.cached_colors(), 2);
    }
}
