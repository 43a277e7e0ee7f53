use crate::{
    common::{BitDepth, ColorIdx, ColorValue, MAX_BPP},
    error::{Error, Result},
    helpers::{scale_color, unscale_color},
};

pub const MAX_COLORS: usize = 256;
pub const MAX_CHANNELS: usize = 4;

/// An ordered list of colors sharing one channel count: 1 (gray), 2 (gray
/// and alpha), 3 (RGB) or 4 (RGBA). Position in the list is the color index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub name: String,
    channels: usize,
    data: Vec<ColorValue>,
}

impl Palette {
    pub fn new(name: &str, channels: usize, colors: &[Vec<ColorValue>]) -> Result<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(Error::InvalidPalette(format!(
                "{} channels per color (expected 1 to {})",
                channels, MAX_CHANNELS
            )));
        }
        if colors.is_empty() || colors.len() > MAX_COLORS {
            return Err(Error::InvalidPalette(format!(
                "{} colors (expected 1 to {})",
                colors.len(),
                MAX_COLORS
            )));
        }
        let mut data = Vec::with_capacity(colors.len() * channels);
        for (i, c) in colors.iter().enumerate() {
            if c.len() != channels {
                return Err(Error::InvalidPalette(format!(
                    "color {} has {} channels, expected {}",
                    i,
                    c.len(),
                    channels
                )));
            }
            data.extend_from_slice(c);
        }
        Ok(Palette {
            name: name.to_string(),
            channels,
            data,
        })
    }

    /// Builds an RGB palette from little-endian 15-bit color words as stored
    /// in SNES CGRAM and GBA palette RAM (red in bits 0-4).
    pub fn from_bgr555(name: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(Error::InvalidPalette(format!(
                "odd length {} for 15-bit color data",
                bytes.len()
            )));
        }
        let colors: Vec<Vec<ColorValue>> = bytes
            .chunks_exact(2)
            .map(|w| {
                let c = w[0] as u16 | (w[1] as u16) << 8;
                let r = c & 31;
                let g = (c >> 5) & 31;
                let b = (c >> 10) & 31;
                vec![scale_color(r as u8), scale_color(g as u8), scale_color(b as u8)]
            })
            .collect();
        Palette::new(name, 3, &colors)
    }

    /// Packs the palette as 15-bit color words, the inverse of `from_bgr555`
    /// up to the precision lost going to 5 bits per channel.
    pub fn to_bgr555(&self) -> Result<Vec<u8>> {
        let rgb = self.with_channels(3)?;
        let mut out = Vec::with_capacity(rgb.len() * 2);
        for c in rgb.colors() {
            let r = unscale_color(c[0]) as u16;
            let g = unscale_color(c[1]) as u16;
            let b = unscale_color(c[2]) as u16;
            let w = r | g << 5 | b << 10;
            out.extend_from_slice(&w.to_le_bytes());
        }
        Ok(out)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn color(&self, idx: usize) -> Option<&[ColorValue]> {
        let start = idx.checked_mul(self.channels)?;
        self.data.get(start..start + self.channels)
    }

    pub fn colors(&self) -> impl Iterator<Item = &[ColorValue]> + '_ {
        self.data.chunks_exact(self.channels)
    }

    /// Finds the first palette entry equal to `color`.
    pub fn find_color(&self, color: &[ColorValue]) -> Option<usize> {
        if color.len() != self.channels {
            return None;
        }
        self.colors().position(|c| c == color)
    }

    /// Converts the palette to another channel count. Alpha is only dropped
    /// when opaque, and RGB only collapses to gray when r == g == b.
    pub fn with_channels(&self, channels: usize) -> Result<Palette> {
        if channels == self.channels {
            return Ok(self.clone());
        }
        let mismatch = Error::ChannelMismatch {
            expected: self.channels,
            actual: channels,
        };
        let mut colors = Vec::with_capacity(self.len());
        for c in self.colors() {
            let (rgb, alpha) = match c {
                [v] => ([*v; 3], 0xFF),
                [v, a] => ([*v; 3], *a),
                [r, g, b] => ([*r, *g, *b], 0xFF),
                [r, g, b, a] => ([*r, *g, *b], *a),
                _ => return Err(mismatch),
            };
            let gray = rgb[0] == rgb[1] && rgb[1] == rgb[2];
            let converted = match channels {
                1 if gray && alpha == 0xFF => vec![rgb[0]],
                2 if gray => vec![rgb[0], alpha],
                3 if alpha == 0xFF => rgb.to_vec(),
                4 => vec![rgb[0], rgb[1], rgb[2], alpha],
                _ => return Err(mismatch),
            };
            colors.push(converted);
        }
        Palette::new(&self.name, channels, &colors)
    }
}

fn check_pixels(pixels: &[ColorValue], channels: usize, palette: &Palette) -> Result<()> {
    if channels != palette.channels() {
        return Err(Error::ChannelMismatch {
            expected: palette.channels(),
            actual: channels,
        });
    }
    if pixels.len() % channels != 0 {
        return Err(Error::PixelCount {
            expected: pixels.len() / channels * channels,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Maps each color of `pixels` (a flat buffer of `channels`-byte colors) to
/// its index in `palette`. No nearest-color search is done: the first color
/// without an exact match is reported with its pixel position.
pub fn match_to_indices(
    pixels: &[ColorValue],
    channels: usize,
    palette: &Palette,
) -> Result<Vec<ColorIdx>> {
    check_pixels(pixels, channels, palette)?;
    pixels
        .chunks_exact(channels)
        .enumerate()
        .map(|(position, color)| match palette.find_color(color) {
            Some(i) => Ok(i as ColorIdx),
            None => Err(Error::ColorNotFound {
                position,
                color: color.to_vec(),
            }),
        })
        .collect()
}

/// Like `match_to_indices`, but colors missing from the palette take
/// `fallback` when one is given. Returns the indices and the number of
/// substituted pixels. The fallback is not range-checked here; encoding
/// rejects it if it doesn't fit the bit depth.
pub fn match_to_indices_or(
    pixels: &[ColorValue],
    channels: usize,
    palette: &Palette,
    fallback: Option<ColorIdx>,
) -> Result<(Vec<ColorIdx>, usize)> {
    let Some(fallback) = fallback else {
        return Ok((match_to_indices(pixels, channels, palette)?, 0));
    };
    check_pixels(pixels, channels, palette)?;
    let mut missing = 0;
    let indices = pixels
        .chunks_exact(channels)
        .map(|color| match palette.find_color(color) {
            Some(i) => i as ColorIdx,
            None => {
                missing += 1;
                fallback
            }
        })
        .collect();
    Ok((indices, missing))
}

/// Looks up every index in `palette`, returning flat channel data.
pub fn apply_palette(indices: &[ColorIdx], palette: &Palette) -> Result<Vec<ColorValue>> {
    let mut out = Vec::with_capacity(indices.len() * palette.channels());
    for (position, &index) in indices.iter().enumerate() {
        let color = palette.color(index as usize).ok_or(Error::IndexOutOfRange {
            position,
            index,
            len: palette.len(),
        })?;
        out.extend_from_slice(color);
    }
    Ok(out)
}

/// Evenly spaced gray levels from black to white, one per index at `bpp`.
pub fn grayscale(bpp: BitDepth, channels: usize) -> Result<Palette> {
    if !(1..=MAX_BPP).contains(&bpp) {
        return Err(Error::InvalidPalette(format!(
            "no grayscale palette for {} bits per pixel",
            bpp
        )));
    }
    let n = 1usize << bpp;
    let step = 255.0 / (n - 1) as f64;
    let colors: Vec<Vec<ColorValue>> = (0..n)
        .map(|t| {
            let value = (step * t as f64).round() as ColorValue;
            match channels {
                2 => vec![value, 0xFF],
                4 => vec![value, value, value, 0xFF],
                _ => vec![value; channels],
            }
        })
        .collect();
    Palette::new(&format!("Grayscale {}bpp", bpp), channels, &colors)
}
