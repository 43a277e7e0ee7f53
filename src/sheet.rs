// Module for laying out tiles as a sheet 16 tiles wide.
//
// Decoding works row-wise: the first pixel row of all 16 tiles in a sheet row
// is produced first, then the second, and so on. Encoding walks the indexed
// image tile by tile, left to right and top to bottom.
use std::ops::Range;

use itertools::{structs::Product, Itertools};
use log::debug;

use crate::{
    codec::Codec,
    common::{BitDepth, ColorIdx, SheetRow, Tile, ROW_SIZE, TILES_PER_ROW, TILE_HEIGHT, TILE_WIDTH},
    error::{Error, Result},
    format::Format,
};

/// Height in pixels of the sheet decoded from `num_bytes` of tile data. The
/// width is always `ROW_SIZE`.
pub fn img_height(num_bytes: usize, bpp: BitDepth) -> usize {
    // With bpp = 2, for example, every sheet row is exactly 256 bytes, so a
    // trailing partial row counts as a whole one.
    let bytes_per_tile = bpp as usize * TILE_HEIGHT;
    let base = bytes_per_tile * TILES_PER_ROW;
    if base == 0 {
        return 0;
    }
    let rounded = num_bytes.div_ceil(base) * base;
    rounded / bytes_per_tile / TILES_PER_ROW * TILE_HEIGHT
}

/// Lazy iterator over the pixel rows of a decoded sheet.
pub struct DecodeRows<'a> {
    bytes: &'a [u8],
    codec: Codec,
    offset: usize,
    y: usize,
}

impl<'a> Iterator for DecodeRows<'a> {
    type Item = SheetRow;

    fn next(&mut self) -> Option<SheetRow> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let tile_size = self.codec.tile_size();
        let end = usize::min(self.offset + self.codec.row_size(), self.bytes.len());
        let tiles = &self.bytes[self.offset..end];
        // The final sheet row may be short: chunks_exact skips the bytes of a
        // trailing partial tile and the missing tiles stay zero.
        let mut row: SheetRow = [0; ROW_SIZE];
        for (n, tile) in tiles.chunks_exact(tile_size).enumerate() {
            for x in 0..TILE_WIDTH {
                row[n * TILE_WIDTH + x] = self.codec.decode_pixel(tile, self.y, x);
            }
        }

        self.y += 1;
        if self.y == TILE_HEIGHT {
            self.y = 0;
            self.offset = end;
        }
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len().saturating_sub(self.offset);
        let rows = img_height(remaining, self.codec.bpp()).saturating_sub(self.y);
        (rows, Some(rows))
    }
}

impl ExactSizeIterator for DecodeRows<'_> {}

pub fn decode(bytes: &[u8], codec: Codec) -> DecodeRows<'_> {
    debug!(
        "Decoding {} bytes as {} {}bpp",
        bytes.len(),
        codec.format(),
        codec.bpp()
    );
    DecodeRows {
        bytes,
        codec,
        offset: 0,
        y: 0,
    }
}

pub fn decode_to_indices(bytes: &[u8], bpp: BitDepth, format: Format) -> Result<DecodeRows<'_>> {
    Ok(decode(bytes, Codec::new(format, bpp)?))
}

/// Lazy iterator over the packed tiles of an indexed image.
pub struct EncodeTiles<'a> {
    indices: &'a [ColorIdx],
    width: usize,
    codec: Codec,
    positions: Product<Range<usize>, Range<usize>>,
    remaining: usize,
}

impl<'a> Iterator for EncodeTiles<'a> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let (ty, tx) = self.positions.next()?;
        self.remaining -= 1;
        let mut tile: Tile = [[0; TILE_WIDTH]; TILE_HEIGHT];
        for (y, row) in tile.iter_mut().enumerate() {
            let start = (ty * TILE_HEIGHT + y) * self.width + tx * TILE_WIDTH;
            row.copy_from_slice(&self.indices[start..start + TILE_WIDTH]);
        }
        Some(self.codec.encode_tile(&tile))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EncodeTiles<'_> {}

/// Prepares `indices` (row-major, `width` x `height`) for encoding. All input
/// checks happen here, so a returned iterator never fails part way.
pub fn encode(
    indices: &[ColorIdx],
    width: usize,
    height: usize,
    codec: Codec,
) -> Result<EncodeTiles<'_>> {
    if width % TILE_WIDTH != 0 || height % TILE_HEIGHT != 0 {
        return Err(Error::Dimension { width, height });
    }
    if indices.len() != width * height {
        return Err(Error::PixelCount {
            expected: width * height,
            actual: indices.len(),
        });
    }
    let limit = 1usize << codec.bpp();
    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i as usize >= limit)
    {
        return Err(Error::IndexOutOfRange {
            position,
            index,
            len: limit,
        });
    }

    debug!(
        "Encoding {}x{} image as {} {}bpp",
        width,
        height,
        codec.format(),
        codec.bpp()
    );
    let tiles_across = width / TILE_WIDTH;
    let tiles_down = height / TILE_HEIGHT;
    Ok(EncodeTiles {
        indices,
        width,
        codec,
        positions: (0..tiles_down).cartesian_product(0..tiles_across),
        remaining: tiles_across * tiles_down,
    })
}

pub fn encode_from_indices(
    indices: &[ColorIdx],
    width: usize,
    height: usize,
    bpp: BitDepth,
    format: Format,
) -> Result<EncodeTiles<'_>> {
    encode(indices, width, height, Codec::new(format, bpp)?)
}

/// An indexed raster, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<ColorIdx>,
}

pub fn decode_image(bytes: &[u8], codec: Codec) -> IndexedImage {
    let height = img_height(bytes.len(), codec.bpp());
    let mut pixels = Vec::with_capacity(ROW_SIZE * height);
    for row in decode(bytes, codec) {
        pixels.extend_from_slice(&row);
    }
    IndexedImage {
        width: ROW_SIZE,
        height,
        pixels,
    }
}

pub fn encode_image(image: &IndexedImage, codec: Codec) -> Result<Vec<u8>> {
    let tiles = encode(&image.pixels, image.width, image.height, codec)?;
    let mut out = Vec::with_capacity(tiles.len() * codec.tile_size());
    for tile in tiles {
        out.extend(tile);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(format: Format, bpp: BitDepth) -> Codec {
        Codec::new(format, bpp).unwrap()
    }

    // Deterministic filler bytes; any byte pattern is valid tile data.
    fn noise(len: usize) -> Vec<u8> {
        let mut state: u32 = 0x1234_5678;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn height_of_one_sheet_row() {
        assert_eq!(img_height(256, 2), 8);
        assert_eq!(img_height(0, 2), 0);
        assert_eq!(img_height(1, 2), 8);
        assert_eq!(img_height(257, 2), 16);
        assert_eq!(img_height(512, 4), 8);
        assert_eq!(img_height(1024 * 3, 8), 24);
    }

    #[test]
    fn height_is_stable_under_rounding() {
        for bpp in 1..=8 {
            for n in [0, 1, 7, 128, 300, 1000, 4095, 4096, 10_000] {
                let h = img_height(n, bpp);
                let row_bytes = bpp as usize * 8 * TILES_PER_ROW;
                assert_eq!(img_height(h / TILE_HEIGHT * row_bytes, bpp), h);
                assert_eq!(h % TILE_HEIGHT, 0);
            }
        }
    }

    #[test]
    fn decode_pads_missing_tiles() {
        let c = codec(Format::Planar, 2);
        let bytes = vec![0xFF; 10 * c.tile_size()];
        let rows: Vec<SheetRow> = decode(&bytes, c).collect();
        assert_eq!(rows.len(), 8);
        for row in &rows {
            assert!(row[..80].iter().all(|&p| p == 3));
            assert!(row[80..].iter().all(|&p| p == 0));
        }
    }

    #[test]
    fn decode_ignores_partial_tile() {
        let c = codec(Format::Planar, 1);
        // One full tile plus 3 stray bytes of a second.
        let bytes = vec![0xFF; 8 + 3];
        let rows: Vec<SheetRow> = decode(&bytes, c).collect();
        assert_eq!(rows.len(), 8);
        for row in &rows {
            assert!(row[..8].iter().all(|&p| p == 1));
            assert!(row[8..].iter().all(|&p| p == 0));
        }
    }

    #[test]
    fn decode_rows_are_row_major() {
        let c = codec(Format::Gba, 8);
        // Tile n is filled with value n, two sheet rows worth.
        let mut bytes = vec![];
        for n in 0..32u8 {
            bytes.extend(std::iter::repeat(n).take(c.tile_size()));
        }
        let image = decode_image(&bytes, c);
        assert_eq!(image.height, 16);
        assert_eq!(image.pixels[0], 0);
        assert_eq!(image.pixels[8], 1);
        assert_eq!(image.pixels[ROW_SIZE * 7 + 127], 15);
        assert_eq!(image.pixels[ROW_SIZE * 8], 16);
        assert_eq!(image.pixels[ROW_SIZE * 15 + 127], 31);
    }

    #[test]
    fn decode_reports_exact_length() {
        let c = codec(Format::Interwined, 4);
        let bytes = noise(c.row_size() * 2 + 5);
        let mut rows = decode(&bytes, c);
        assert_eq!(rows.len(), 24);
        rows.next();
        assert_eq!(rows.len(), 23);
        assert_eq!(rows.count(), 23);
        assert_eq!(decode(&[], c).count(), 0);
    }

    #[test]
    fn encode_checks_dimensions() {
        let c = codec(Format::Planar, 2);
        let pixels = vec![0; 12 * 8];
        assert_eq!(
            encode(&pixels, 12, 8, c).err(),
            Some(Error::Dimension { width: 12, height: 8 })
        );
        assert_eq!(
            encode(&pixels, 8, 8, c).err(),
            Some(Error::PixelCount { expected: 64, actual: 96 })
        );
    }

    #[test]
    fn encode_checks_index_range() {
        let c = codec(Format::Planar, 2);
        let mut pixels = vec![0; 64];
        pixels[10] = 4;
        assert_eq!(
            encode(&pixels, 8, 8, c).err(),
            Some(Error::IndexOutOfRange { position: 10, index: 4, len: 4 })
        );
    }

    #[test]
    fn encode_tile_order() {
        let c = codec(Format::Gba, 8);
        // 16x16 image of 4 tiles, each filled with its tile number.
        let mut pixels = vec![0; 16 * 16];
        for y in 0..16 {
            for x in 0..16 {
                pixels[y * 16 + x] = ((y / 8) * 2 + x / 8) as u8;
            }
        }
        let tiles: Vec<Vec<u8>> = encode(&pixels, 16, 16, c).unwrap().collect();
        assert_eq!(tiles.len(), 4);
        for (n, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.len(), 64);
            assert!(tile.iter().all(|&b| b == n as u8));
        }
    }

    #[test]
    fn encode_walks_wide_grids_row_major() {
        let c = codec(Format::Gba, 8);
        // 24x16 image: 3 tiles across, 2 down.
        let pixels: Vec<ColorIdx> = (0..24 * 16)
            .map(|i| ((i / 24 / 8) * 3 + (i % 24) / 8) as ColorIdx)
            .collect();
        let mut tiles = encode(&pixels, 24, 16, c).unwrap();
        for n in 0..6u8 {
            assert_eq!(tiles.len(), 6 - n as usize);
            assert_eq!(tiles.next(), Some(vec![n; 64]));
        }
        assert_eq!(tiles.len(), 0);
        assert_eq!(tiles.next(), None);
    }

    #[test]
    fn bytes_survive_decoding() {
        for format in Format::ALL {
            for &bpp in format.supported_bpps() {
                let c = codec(format, bpp);
                let bytes = noise(c.row_size() * 3);
                let image = decode_image(&bytes, c);
                assert_eq!(encode_image(&image, c).unwrap(), bytes, "{format} {bpp}bpp");
            }
        }
    }

    #[test]
    fn images_survive_encoding() {
        for format in Format::ALL {
            for &bpp in format.supported_bpps() {
                let c = codec(format, bpp);
                let limit = 1usize << bpp;
                let pixels: Vec<ColorIdx> = noise(ROW_SIZE * 16)
                    .into_iter()
                    .map(|b| (b as usize % limit) as ColorIdx)
                    .collect();
                let image = IndexedImage {
                    width: ROW_SIZE,
                    height: 16,
                    pixels,
                };
                let bytes = encode_image(&image, c).unwrap();
                assert_eq!(decode_image(&bytes, c), image, "{format} {bpp}bpp");
            }
        }
    }

    #[test]
    fn entry_points_validate_configuration() {
        assert!(matches!(
            decode_to_indices(&[0; 64], 2, Format::Gba),
            Err(Error::Configuration { bpp: 2, .. })
        ));
        assert!(encode_from_indices(&[0; 64], 8, 8, 3, Format::Gba).is_err());
        let tiles: Vec<Vec<u8>> = encode_from_indices(&[3; 64], 8, 8, 2, Format::Planar)
            .unwrap()
            .collect();
        assert_eq!(tiles, vec![vec![0xFF; 16]]);
    }
}
