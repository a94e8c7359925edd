use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use log::info;

use nes_chr_convert::{
    convert::convert,
    persist::{
        crop_to_pages, load_png, palette_lines, save_chr, save_palette_dat, save_palette_json,
        save_preview_png, IndexedPreview,
    },
    system_palette::SystemPalette,
};

/// Convert an image to NES CHR format.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the input PNG image
    image: PathBuf,

    /// Output base name (without extension); defaults to the input path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON file with an array of "#rrggbb" system colors to use instead of
    /// the built-in NES palette
    #[arg(long)]
    system_colors: Option<PathBuf>,

    /// Also write the palettes as JSON
    #[arg(long)]
    json_palettes: bool,
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let output_base = args
        .output
        .clone()
        .unwrap_or_else(|| args.image.with_extension(""));

    let image = load_png(&args.image)?;
    info!(
        "Loaded image: {} ({}x{})",
        args.image.display(),
        image.width(),
        image.height()
    );
    let image = crop_to_pages(&image)?;

    let system = match &args.system_colors {
        Some(path) => SystemPalette::load(path)?,
        None => SystemPalette::nes(),
    };
    info!("Using {} system colors", system.len());

    info!("Processing image...");
    let result = convert(&image, &system);
    let preview = IndexedPreview::new(&result.preview, &result.palettes)?;

    save_chr(&with_suffix(&output_base, ".chr"), &result.chr)?;
    save_preview_png(&with_suffix(&output_base, "_indexed.png"), &preview)?;
    save_palette_dat(&with_suffix(&output_base, "_palette.dat"), &result.palettes)?;
    if args.json_palettes {
        save_palette_json(&with_suffix(&output_base, "_palette.json"), &result.palettes)?;
    }

    info!("Palettes:");
    for (i, line) in palette_lines(&result.palettes).iter().enumerate() {
        info!("Palette {}: {}", i, line);
    }
    Ok(())
}
