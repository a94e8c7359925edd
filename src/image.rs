use anyhow::{ensure, Result};

use crate::common::ColorRGB;

pub type PixelCoord = usize;

/// A width x height grid of RGB pixels, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    width: PixelCoord,
    height: PixelCoord,
    pixels: Vec<ColorRGB>,
}

impl RgbImage {
    pub fn new(width: PixelCoord, height: PixelCoord, fill: ColorRGB) -> Self {
        RgbImage {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn from_pixels(
        width: PixelCoord,
        height: PixelCoord,
        pixels: Vec<ColorRGB>,
    ) -> Result<Self> {
        ensure!(
            pixels.len() == width * height,
            "pixel count {} does not match {}x{}",
            pixels.len(),
            width,
            height
        );
        Ok(RgbImage {
            width,
            height,
            pixels,
        })
    }

    pub fn from_fn(
        width: PixelCoord,
        height: PixelCoord,
        mut f: impl FnMut(PixelCoord, PixelCoord) -> ColorRGB,
    ) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        RgbImage {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> PixelCoord {
        self.width
    }

    pub fn height(&self) -> PixelCoord {
        self.height
    }

    pub fn in_bounds(&self, x: PixelCoord, y: PixelCoord) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: PixelCoord, y: PixelCoord) -> Option<ColorRGB> {
        if self.in_bounds(x, y) {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: PixelCoord, y: PixelCoord, c: ColorRGB) {
        if self.in_bounds(x, y) {
            self.pixels[y * self.width + x] = c;
        }
    }

    pub fn pixels(&self) -> &[ColorRGB] {
        &self.pixels
    }

    /// Copy of the top-left `width` x `height` region. Both dimensions must
    /// fit inside the image.
    pub fn crop(&self, width: PixelCoord, height: PixelCoord) -> Result<Self> {
        ensure!(
            width <= self.width && height <= self.height,
            "cannot crop {}x{} image to {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        Ok(RgbImage::from_fn(width, height, |x, y| {
            self.pixels[y * self.width + x]
        }))
    }
}
