use thiserror::Error;

use crate::{
    common::{BitDepth, ColorIdx, ColorValue},
    format::Format,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{format} format does not support {bpp} bits per pixel (supported: {supported:?})")]
    Configuration {
        format: Format,
        bpp: BitDepth,
        supported: &'static [BitDepth],
    },
    #[error("image dimensions {width}x{height} are not multiples of 8")]
    Dimension { width: usize, height: usize },
    #[error("expected {expected} pixel indices, got {actual}")]
    PixelCount { expected: usize, actual: usize },
    #[error("image has {actual} channels but palette has {expected}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("color {color:?} at pixel {position} not found in palette")]
    ColorNotFound {
        position: usize,
        color: Vec<ColorValue>,
    },
    #[error("index {index} at pixel {position} out of range (limit {len})")]
    IndexOutOfRange {
        position: usize,
        index: ColorIdx,
        len: usize,
    },
    #[error("invalid palette: {0}")]
    InvalidPalette(String),
}

pub type Result<T> = std::result::Result<T, Error>;
