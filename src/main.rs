use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use chr_convert::{
    common::{BitDepth, ColorIdx, ROW_SIZE},
    palette::{self, Palette},
    persist::{self, Raster},
    sheet,
    state::{self, GlobalConfig},
    Codec, Format, Preset,
};

#[derive(Parser, Debug)]
#[command(name = "chrconvert", about = "Convert console tile data to images and back")]
struct Args {
    /// File to convert
    input: PathBuf,

    /// Output to FILENAME (default output.png, or output.chr with --reverse)
    #[arg(short, long, value_name = "FILENAME")]
    output: Option<PathBuf>,

    /// Convert from image to tile data
    #[arg(short, long)]
    reverse: bool,

    /// Bits per pixel
    #[arg(short, long)]
    bpp: Option<BitDepth>,

    /// Layout of the tile data
    #[arg(short, long, value_enum)]
    data_mode: Option<Format>,

    /// Console preset setting both layout and bpp
    #[arg(short, long, value_enum)]
    mode: Option<Preset>,

    /// Palette file (.json, or raw 15-bit BGR colors)
    #[arg(short, long, value_name = "FILE")]
    palette: Option<PathBuf>,

    /// Use this index for image colors missing from the palette instead of failing
    #[arg(long, value_name = "INDEX")]
    substitute_index: Option<ColorIdx>,

    /// Write the palette used for the conversion to FILE
    #[arg(long, value_name = "FILE")]
    dump_palette: Option<PathBuf>,

    /// Config file with default settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn select_palette(path: Option<&Path>, bpp: BitDepth, channels: usize) -> Result<Palette> {
    match path {
        Some(p) => {
            let pal = persist::load_palette(p)?
                .with_channels(channels)
                .with_context(|| {
                    format!("Palette {} can't be used with this image", p.display())
                })?;
            if pal.len() > 1 << bpp {
                warn!(
                    "Palette has {} colors, only the first {} are reachable at {}bpp",
                    pal.len(),
                    1 << bpp,
                    bpp
                );
            }
            Ok(pal)
        }
        None => Ok(palette::grayscale(bpp, channels)?),
    }
}

fn make_indexed(
    raster: &Raster,
    pal: &Palette,
    fallback: Option<ColorIdx>,
) -> Result<Vec<ColorIdx>> {
    let (indices, missing) =
        palette::match_to_indices_or(&raster.data, raster.channels, pal, fallback)?;
    if let (Some(index), true) = (fallback, missing > 0) {
        warn!(
            "{} pixels had colors missing from the palette, using index {}",
            missing, index
        );
    }
    Ok(indices)
}

fn image_to_chr(
    args: &Args,
    codec: Codec,
    palette_path: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let raster = persist::load_png(&args.input)?;
    info!(
        "Encoding {}x{} image as {} {}bpp",
        raster.width,
        raster.height,
        codec.format(),
        codec.bpp()
    );
    let pal = select_palette(palette_path, codec.bpp(), raster.channels)?;
    if let Some(dump) = &args.dump_palette {
        persist::save_palette(dump, &pal)?;
    }
    let indices = make_indexed(&raster, &pal, args.substitute_index)
        .with_context(|| format!("Couldn't index {}", args.input.display()))?;
    let tiles = sheet::encode(
        &indices,
        raster.width as usize,
        raster.height as usize,
        codec,
    )?;
    let count = persist::write_tiles(output, tiles)?;
    info!("Wrote {} tiles", count);
    Ok(())
}

fn chr_to_image(
    args: &Args,
    codec: Codec,
    palette_path: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let bytes = persist::read_tiles(&args.input)?;
    let height = sheet::img_height(bytes.len(), codec.bpp());
    info!(
        "Decoding {} bytes as {} {}bpp into a {}x{} image",
        bytes.len(),
        codec.format(),
        codec.bpp(),
        ROW_SIZE,
        height
    );
    let pal = match palette_path {
        Some(p) => persist::load_palette(p)?,
        None => palette::grayscale(codec.bpp(), 4)?,
    };
    if let Some(dump) = &args.dump_palette {
        persist::save_palette(dump, &pal)?;
    }

    let mut data = Vec::with_capacity(ROW_SIZE * height * pal.channels());
    for row in sheet::decode(&bytes, codec) {
        data.extend(palette::apply_palette(&row, &pal)?);
    }
    let raster = Raster {
        width: ROW_SIZE as u32,
        height: height as u32,
        channels: pal.channels(),
        data,
    };
    persist::save_png(output, &raster)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config_path = match &args.config {
        Some(p) => p.clone(),
        None => state::get_global_config_path()?,
    };
    let config: GlobalConfig = state::load_global_config(&config_path)?;
    let (format, bpp) = state::resolve_settings(args.bpp, args.data_mode, args.mode, &config);
    let codec = Codec::new(format, bpp)?;
    let palette_path = args.palette.as_deref().or(config.palette.as_deref());

    if args.reverse {
        let output = args.output.clone().unwrap_or_else(|| "output.chr".into());
        image_to_chr(&args, codec, palette_path, &output)
    } else {
        let output = args.output.clone().unwrap_or_else(|| "output.png".into());
        chr_to_image(&args, codec, palette_path, &output)
    }
}
