// Partitioning of the quantized colors into 4 palettes of 4 colors that
// share a common background color.
use std::cmp::Reverse;

use hashbrown::HashMap;
use itertools::Itertools;
use log::debug;

use crate::{
    common::{
        color_distance, format_hex_color, ColorRGB, PaletteIdx, COLORS_PER_PALETTE, NUM_PALETTES,
    },
    quantize::QuantizedImage,
    system_palette::SystemPalette,
    tile::{tile_colors, tile_grid},
};

pub type Palette = [ColorRGB; COLORS_PER_PALETTE];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteSet {
    palettes: [Palette; NUM_PALETTES],
}

impl PaletteSet {
    pub fn new(palettes: [Palette; NUM_PALETTES]) -> Self {
        PaletteSet { palettes }
    }

    pub fn palettes(&self) -> &[Palette; NUM_PALETTES] {
        &self.palettes
    }

    pub fn get(&self, idx: PaletteIdx) -> &Palette {
        &self.palettes[idx as usize]
    }

    /// Shared color at position 0 of every palette.
    pub fn background(&self) -> ColorRGB {
        self.palettes[0][0]
    }

    /// Every color used by the set, without repeats, in palette order.
    pub fn distinct_colors(&self) -> Vec<ColorRGB> {
        self.palettes.iter().flatten().copied().unique().collect()
    }
}

/// Per-image color statistics gathered over the 8x8 tile grid.
///
/// `frequency` counts the tiles a color appears in. `co_occurrence` counts,
/// for each ordered pair of distinct colors, the tiles containing both.
#[derive(Default, Debug)]
pub struct ColorStats {
    order: Vec<ColorRGB>,
    frequency: HashMap<ColorRGB, u32>,
    co_occurrence: HashMap<(ColorRGB, ColorRGB), u32>,
}

impl ColorStats {
    pub fn collect(image: &QuantizedImage) -> Self {
        let mut stats = ColorStats::default();
        for origin in tile_grid(image) {
            let colors = tile_colors(image, origin);
            stats.add_tile(&colors);
        }
        stats
    }

    fn add_tile(&mut self, colors: &[ColorRGB]) {
        for &c in colors {
            let count = self.frequency.entry(c).or_insert(0);
            if *count == 0 {
                self.order.push(c);
            }
            *count += 1;
        }
        for (&c1, &c2) in colors.iter().tuple_combinations() {
            *self.co_occurrence.entry((c1, c2)).or_insert(0) += 1;
            *self.co_occurrence.entry((c2, c1)).or_insert(0) += 1;
        }
    }

    /// Colors in order of first appearance.
    pub fn colors(&self) -> &[ColorRGB] {
        &self.order
    }

    pub fn frequency(&self, c: ColorRGB) -> u32 {
        self.frequency.get(&c).copied().unwrap_or(0)
    }

    pub fn co_occurrence(&self, a: ColorRGB, b: ColorRGB) -> u32 {
        self.co_occurrence.get(&(a, b)).copied().unwrap_or(0)
    }

    /// Most frequent color; the earliest seen wins ties.
    pub fn most_frequent(&self) -> Option<ColorRGB> {
        self.order
            .iter()
            .copied()
            .min_by_key(|&c| Reverse(self.frequency(c)))
    }
}

pub fn build_palettes(image: &QuantizedImage, system: &SystemPalette) -> PaletteSet {
    let stats = ColorStats::collect(image);
    build_palettes_from_stats(&stats, system)
}

pub fn build_palettes_from_stats(stats: &ColorStats, system: &SystemPalette) -> PaletteSet {
    let background = stats.most_frequent().unwrap_or_else(|| system.first());
    debug!("Background color: {}", format_hex_color(background));

    let mut palettes: Vec<Vec<ColorRGB>> = vec![vec![background]; NUM_PALETTES];
    let mut remaining: Vec<ColorRGB> = stats
        .colors()
        .iter()
        .copied()
        .filter(|&c| c != background)
        .collect();

    if remaining.len() <= NUM_PALETTES * (COLORS_PER_PALETTE - 1) {
        debug!(
            "Only {} non-background colors; distributing in order",
            remaining.len()
        );
        let mut colors = remaining.into_iter();
        for pal in &mut palettes {
            while pal.len() < COLORS_PER_PALETTE {
                match colors.next() {
                    Some(c) => pal.push(c),
                    None => break,
                }
            }
        }
        return finish(palettes, background);
    }

    // Farthest-point seeding: the most frequent color first, then whichever
    // color is farthest from its nearest already chosen seed.
    let mut seeds: Vec<ColorRGB> = vec![];
    for i in 0..NUM_PALETTES.min(remaining.len()) {
        let pos = if i == 0 {
            remaining
                .iter()
                .position_min_by_key(|&&c| Reverse(stats.frequency(c)))
        } else {
            remaining.iter().position_min_by_key(|&&c| {
                Reverse(
                    seeds
                        .iter()
                        .map(|&s| color_distance(c, s))
                        .min()
                        .unwrap_or(0),
                )
            })
        };
        let Some(pos) = pos else { break };
        seeds.push(remaining.remove(pos));
    }
    debug!(
        "Seeds: {}",
        seeds.iter().map(|&c| format_hex_color(c)).join(", ")
    );
    for (pal, &seed) in palettes.iter_mut().zip(&seeds) {
        pal.push(seed);
    }

    // Greedy assignment by co-occurrence with the colors already placed.
    let sorted = remaining
        .into_iter()
        .sorted_by_key(|&c| Reverse(stats.frequency(c)));
    for color in sorted {
        let mut best: Option<(usize, u32)> = None;
        for (idx, pal) in palettes.iter().enumerate() {
            if pal.len() >= COLORS_PER_PALETTE {
                continue;
            }
            let score: u32 = pal.iter().map(|&c| stats.co_occurrence(color, c)).sum();
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }
        match best {
            Some((idx, _)) => palettes[idx].push(color),
            None => debug!("No room left for {}", format_hex_color(color)),
        }
    }

    finish(palettes, background)
}

// Pad short palettes by repeating their last entry.
fn finish(mut palettes: Vec<Vec<ColorRGB>>, background: ColorRGB) -> PaletteSet {
    let mut out = [[background; COLORS_PER_PALETTE]; NUM_PALETTES];
    for (pal, dst) in palettes.iter_mut().zip(out.iter_mut()) {
        while pal.len() < COLORS_PER_PALETTE {
            let last = pal.last().copied().unwrap_or(background);
            pal.push(last);
        }
        dst.copy_from_slice(&pal[..COLORS_PER_PALETTE]);
    }
    PaletteSet::new(out)
}
