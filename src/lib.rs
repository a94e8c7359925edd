//! Conversion of RGB images into NES pattern-table (CHR) graphics.
//!
//! Every pixel is first mapped onto the fixed NES system palette. The
//! quantized colors are then grouped into four 4-color palettes sharing one
//! background color, each 8x8 tile picks the palette that covers it best,
//! and the tile is written as two bit planes.

pub mod chr;
pub mod cluster;
pub mod common;
pub mod convert;
pub mod image;
pub mod persist;
pub mod quantize;
pub mod system_palette;
pub mod tile;

pub use cluster::{Palette, PaletteSet};
pub use common::ColorRGB;
pub use convert::{convert, Conversion};
pub use image::RgbImage;
pub use system_palette::SystemPalette;
