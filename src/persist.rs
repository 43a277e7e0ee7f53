use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{bail, ensure, Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Serializer;

use crate::{common::ColorValue, palette::Palette};

/// A decoded image with 8-bit channels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub data: Vec<ColorValue>,
}

#[derive(Serialize, Deserialize)]
struct PaletteFile {
    name: String,
    colors: Vec<Vec<ColorValue>>,
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, &data_bytes)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes = std::fs::read(path)?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("Unable to parse {}", path.display()))?;
    Ok(data)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Loads a palette from JSON (`{"name": ..., "colors": [[r, g, b], ...]}`) or,
/// for any other extension, from raw 15-bit BGR color words.
pub fn load_palette(path: &Path) -> Result<Palette> {
    if is_json(path) {
        let file: PaletteFile = load_json(path)?;
        let channels = file.colors.first().map_or(0, |c| c.len());
        let pal = Palette::new(&file.name, channels, &file.colors)
            .with_context(|| format!("Invalid palette in {}", path.display()))?;
        Ok(pal)
    } else {
        info!("Loading {}", path.display());
        let bytes = fs::read(path)?;
        let name = path
            .file_stem()
            .map_or("Palette".to_string(), |s| s.to_string_lossy().into_owned());
        let pal = Palette::from_bgr555(&name, &bytes)
            .with_context(|| format!("Invalid palette in {}", path.display()))?;
        Ok(pal)
    }
}

pub fn save_palette(path: &Path, pal: &Palette) -> Result<()> {
    if is_json(path) {
        let file = PaletteFile {
            name: pal.name.clone(),
            colors: pal.colors().map(|c| c.to_vec()).collect(),
        };
        save_json(path, &file)
    } else {
        info!("Saving {}", path.display());
        fs::write(path, pal.to_bgr555()?)?;
        Ok(())
    }
}

pub fn read_tiles(path: &Path) -> Result<Vec<u8>> {
    info!("Loading {}", path.display());
    let bytes = fs::read(path).with_context(|| format!("Couldn't open {}", path.display()))?;
    ensure!(!bytes.is_empty(), "{} contains no tile data", path.display());
    Ok(bytes)
}

pub fn write_tiles<I>(path: &Path, tiles: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    info!("Saving {}", path.display());
    let file = File::create(path).with_context(|| format!("Couldn't write to {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut count = 0;
    for tile in tiles {
        out.write_all(&tile)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

pub fn load_png(path: &Path) -> Result<Raster> {
    info!("Loading {}", path.display());
    let file = File::open(path).with_context(|| format!("Couldn't load image {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    // Palette and low bit-depth images are widened, 16-bit ones narrowed, so
    // every image arrives with 8-bit channels.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut data = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut data)?;
    ensure!(
        frame.bit_depth == png::BitDepth::Eight,
        "Unexpected bit depth {:?} in {}",
        frame.bit_depth,
        path.display()
    );
    let channels = match frame.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => bail!("Palette was not expanded in {}", path.display()),
    };
    // Rows are tightly packed at 8 bits per channel.
    data.truncate(frame.width as usize * frame.height as usize * channels);
    Ok(Raster {
        width: frame.width,
        height: frame.height,
        channels,
        data,
    })
}

pub fn save_png(path: &Path, raster: &Raster) -> Result<()> {
    info!("Saving {}", path.display());
    let color_type = match raster.channels {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => bail!("Can't save an image with {} channels", n),
    };
    ensure!(
        raster.data.len() == raster.width as usize * raster.height as usize * raster.channels,
        "Image data doesn't match its dimensions"
    );
    let file = File::create(path).with_context(|| format!("Couldn't write to {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), raster.width, raster.height);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&raster.data)?;
    writer.finish()?;
    Ok(())
}
