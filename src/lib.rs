pub mod bits;
pub mod codec;
pub mod common;
pub mod error;
pub mod format;
pub mod helpers;
pub mod palette;
pub mod persist;
pub mod sheet;
pub mod state;

pub use codec::Codec;
pub use error::{Error, Result};
pub use format::{Format, Preset};
pub use palette::{apply_palette, grayscale, match_to_indices, match_to_indices_or, Palette};
pub use sheet::{decode_to_indices, encode_from_indices, img_height, IndexedImage};
