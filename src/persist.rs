use std::{
    fs,
    io::{BufWriter, Cursor},
    path::Path,
};

use anyhow::{bail, Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Serializer;

use crate::{
    cluster::PaletteSet,
    common::{format_hex_color, ColorRGB},
    image::{PixelCoord, RgbImage},
    tile::PAGE_SIZE,
};

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    data_bytes.push(b'\n');
    create_parent_dir(path)?;
    fs::write(path, &data_bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(data)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Decode a PNG of any color type or bit depth into 8-bit RGB. Alpha is
/// discarded.
pub fn load_png(path: &Path) -> Result<RgbImage> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_png(&data).with_context(|| format!("decoding {}", path.display()))
}

pub fn decode_png(data: &[u8]) -> Result<RgbImage> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    buf.truncate(frame.buffer_size());

    let (width, height) = (frame.width as PixelCoord, frame.height as PixelCoord);
    let channels = match frame.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => bail!("indexed PNG was not expanded"),
    };
    let pixels: Vec<ColorRGB> = buf
        .chunks_exact(channels)
        .map(|c| match channels {
            1 | 2 => [c[0], c[0], c[0]],
            _ => [c[0], c[1], c[2]],
        })
        .collect();
    RgbImage::from_pixels(width, height, pixels)
}

/// Working dimensions for an image: width clamped to one page, height
/// floored to whole pages with a minimum of one page.
pub fn page_dimensions(width: PixelCoord, height: PixelCoord) -> (PixelCoord, PixelCoord) {
    let width = width.min(PAGE_SIZE);
    let height = (height / PAGE_SIZE * PAGE_SIZE).max(PAGE_SIZE);
    (width, height)
}

/// Crop an image to its working dimensions. An image shorter than one page
/// keeps its rows; the missing ones become padding tiles during conversion.
pub fn crop_to_pages(image: &RgbImage) -> Result<RgbImage> {
    let (orig_width, orig_height) = (image.width(), image.height());
    let (width, height) = page_dimensions(orig_width, orig_height);
    if orig_width > width {
        warn!(
            "Image width ({}) exceeds {} pixels, cropping to {}px width",
            orig_width, PAGE_SIZE, width
        );
    }
    let height = height.min(orig_height);
    if width == orig_width && height == orig_height {
        return Ok(image.clone());
    }
    info!(
        "Cropping image from {}x{} to {}x{}",
        orig_width, orig_height, width, height
    );
    image.crop(width, height)
}

pub fn save_chr(path: &Path, chr: &[u8]) -> Result<()> {
    create_parent_dir(path)?;
    fs::write(path, chr).with_context(|| format!("writing {}", path.display()))?;
    info!("Saved CHR file: {} ({} bytes)", path.display(), chr.len());
    Ok(())
}

/// The preview as palette indices. The color table is the distinct colors
/// of the palette set.
pub struct IndexedPreview {
    width: PixelCoord,
    height: PixelCoord,
    colors: Vec<ColorRGB>,
    indices: Vec<u8>,
}

impl IndexedPreview {
    pub fn new(preview: &RgbImage, palettes: &PaletteSet) -> Result<Self> {
        let colors = palettes.distinct_colors();
        let indices = preview
            .pixels()
            .iter()
            .map(|c| match colors.iter().position(|p| p == c) {
                Some(i) => Ok(i as u8),
                None => bail!("preview color {} not in palettes", format_hex_color(*c)),
            })
            .collect::<Result<Vec<u8>>>()?;
        Ok(IndexedPreview {
            width: preview.width(),
            height: preview.height(),
            colors,
            indices,
        })
    }

    pub fn colors(&self) -> &[ColorRGB] {
        &self.colors
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }
}

pub fn save_preview_png(path: &Path, preview: &IndexedPreview) -> Result<()> {
    create_parent_dir(path)?;
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        preview.width as u32,
        preview.height as u32,
    );
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(preview.colors.iter().flatten().copied().collect::<Vec<u8>>());
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&preview.indices)?;
    writer.finish()?;
    info!("Saved indexed preview: {}", path.display());
    Ok(())
}

/// One line per palette: comma-separated `#rrggbb` colors, background first.
pub fn palette_lines(palettes: &PaletteSet) -> Vec<String> {
    palettes
        .palettes()
        .iter()
        .map(|pal| {
            pal.iter()
                .map(|&c| format_hex_color(c))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect()
}

pub fn save_palette_dat(path: &Path, palettes: &PaletteSet) -> Result<()> {
    let mut text = String::new();
    for line in palette_lines(palettes) {
        text.push_str(&line);
        text.push('\n');
    }
    create_parent_dir(path)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("Saved palette file: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct PaletteReport {
    background: String,
    palettes: Vec<Vec<String>>,
}

pub fn save_palette_json(path: &Path, palettes: &PaletteSet) -> Result<()> {
    let report = PaletteReport {
        background: format_hex_color(palettes.background()),
        palettes: palettes
            .palettes()
            .iter()
            .map(|pal| pal.iter().map(|&c| format_hex_color(c)).collect())
            .collect(),
    };
    save_json(path, &report)
}
