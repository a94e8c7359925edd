use anyhow::{ensure, Context, Result};

pub type ColorValue = u8; // Color channel value (0-255)
pub type ColorIdx = u8; // Index into a 2bpp palette (0-3)
pub type PaletteIdx = u8; // Index into the palette set (0-3)

pub type ColorRGB = [ColorValue; 3];

pub const NUM_PALETTES: usize = 4;
pub const COLORS_PER_PALETTE: usize = 4;

// Squared Euclidean distance in RGB space (no weighting).
pub fn color_distance(a: ColorRGB, b: ColorRGB) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, y)| {
            let diff = x as i32 - y as i32;
            (diff * diff) as u32
        })
        .sum()
}

/// Index of the entry in `colors` closest to `c`. The first of several
/// equally close entries wins. Returns `None` only if `colors` is empty.
pub fn nearest_index(c: ColorRGB, colors: &[ColorRGB]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &candidate) in colors.iter().enumerate() {
        let d = color_distance(c, candidate);
        match best {
            Some((_, best_d)) if best_d <= d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

pub fn parse_hex_color(s: &str) -> Result<ColorRGB> {
    let s = s.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);
    ensure!(
        hex.len() == 6 && hex.is_ascii(),
        "invalid color {:?}: expected 6 hex digits",
        s
    );
    let mut c: ColorRGB = [0, 0, 0];
    for (channel, digits) in c.iter_mut().zip(hex.as_bytes().chunks(2)) {
        let digits = std::str::from_utf8(digits)?;
        *channel = u8::from_str_radix(digits, 16)
            .with_context(|| format!("invalid color {:?}", s))?;
    }
    Ok(c)
}

pub fn format_hex_color(c: ColorRGB) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}
