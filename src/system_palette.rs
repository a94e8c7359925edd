// The fixed set of colors the NES PPU can display.
use std::path::Path;

use anyhow::{ensure, Context, Result};
use log::info;

use crate::common::{nearest_index, parse_hex_color, ColorRGB};

// Order matters: nearest-color ties resolve to the earliest entry.
pub const NES_COLORS: [&str; 55] = [
    "#000000", "#0000bc", "#0000fc", "#004058", "#005800", "#0058f8", "#006800", "#007800",
    "#0078f8", "#008888", "#00a800", "#00a844", "#00b800", "#00e8d8", "#00fcfc", "#3cbcfc",
    "#4428bc", "#503000", "#58d854", "#58f898", "#6844fc", "#6888fc", "#787878", "#7c7c7c",
    "#881400", "#940084", "#9878f8", "#a4e4fc", "#a80020", "#a81000", "#ac7c00", "#b8b8f8",
    "#b8f818", "#b8f8b8", "#b8f8d8", "#bcbcbc", "#d800cc", "#d8b8f8", "#d8f878", "#e40058",
    "#e45c10", "#f0d0b0", "#f83800", "#f85898", "#f87858", "#f878f8", "#f8a4c0", "#f8b800",
    "#f8b8f8", "#f8d878", "#f8d8f8", "#f8f8f8", "#fca044", "#fce0a8", "#fcfcfc",
];

#[derive(Clone, Debug)]
pub struct SystemPalette {
    colors: Vec<ColorRGB>,
}

impl SystemPalette {
    pub fn new(colors: Vec<ColorRGB>) -> Result<Self> {
        ensure!(!colors.is_empty(), "system color list is empty");
        Ok(SystemPalette { colors })
    }

    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let colors = entries
            .iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| parse_hex_color(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(colors)
    }

    /// The embedded NES color list.
    pub fn nes() -> Self {
        let colors = NES_COLORS
            .iter()
            .filter_map(|s| parse_hex_color(s).ok())
            .collect();
        SystemPalette { colors }
    }

    /// Load an override list: a JSON array of `"#rrggbb"` strings.
    pub fn load(path: &Path) -> Result<Self> {
        let entries: Vec<String> = crate::persist::load_json(path)?;
        let pal = Self::from_hex(&entries)
            .with_context(|| format!("reading system colors from {}", path.display()))?;
        info!("Loaded {} system colors from {}", pal.len(), path.display());
        Ok(pal)
    }

    pub fn colors(&self) -> &[ColorRGB] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn first(&self) -> ColorRGB {
        self.colors[0]
    }

    pub fn contains(&self, c: ColorRGB) -> bool {
        self.colors.contains(&c)
    }

    pub fn nearest(&self, c: ColorRGB) -> ColorRGB {
        // Non-empty by construction.
        let idx = nearest_index(c, &self.colors).unwrap_or(0);
        self.colors[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_list_parses() {
        let pal = SystemPalette::nes();
        assert_eq!(pal.len(), NES_COLORS.len());
        assert_eq!(pal.first(), [0, 0, 0]);
        assert!(pal.contains([0xfc, 0xfc, 0xfc]));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(SystemPalette::new(vec![]).is_err());
        assert!(SystemPalette::from_hex(&["", "  "]).is_err());
    }

    #[test]
    fn nearest_matches_exact_and_ties() {
        let pal = SystemPalette::nes();
        assert_eq!(pal.nearest([0xf8, 0x38, 0x00]), [0xf8, 0x38, 0x00]);
        assert_eq!(pal.nearest([255, 255, 255]), [0xfc, 0xfc, 0xfc]);

        let pal = SystemPalette::from_hex(&["#000000", "#141414", "#000000"]).unwrap();
        assert_eq!(pal.nearest([10, 10, 10]), [0, 0, 0]);
    }
}
