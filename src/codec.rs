// Module for packing and unpacking the pixels of a single 8x8 tile.
use crate::{
    bits::{getbit, getbits, setbit, setbits},
    common::{BitDepth, ColorIdx, Tile, MAX_BPP, TILES_PER_ROW, TILE_HEIGHT, TILE_WIDTH},
    error::{Error, Result},
    format::Format,
};

/// A validated (format, bpp) pair. Holding one guarantees that every tile
/// operation below has a well-defined byte layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Codec {
    format: Format,
    bpp: BitDepth,
}

impl Codec {
    pub fn new(format: Format, bpp: BitDepth) -> Result<Self> {
        if !format.supports(bpp) {
            return Err(Error::Configuration {
                format,
                bpp,
                supported: format.supported_bpps(),
            });
        }
        Ok(Codec { format, bpp })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn bpp(&self) -> BitDepth {
        self.bpp
    }

    /// Bytes of packed data for one tile.
    pub fn tile_size(&self) -> usize {
        self.bpp as usize * TILE_HEIGHT
    }

    /// Bytes of packed data for one 16-tile sheet row.
    pub fn row_size(&self) -> usize {
        self.tile_size() * TILES_PER_ROW
    }

    /// Reads the color index at row `y`, column `x` of `tile`, which must hold
    /// at least `tile_size()` bytes.
    pub fn decode_pixel(&self, tile: &[u8], y: usize, x: usize) -> ColorIdx {
        match self.format {
            Format::Planar => decode_planar(tile, y, x, self.bpp),
            Format::Interwined => decode_interwined(tile, y, x, self.bpp),
            Format::Gba => decode_gba(tile, y, x, self.bpp),
        }
    }

    /// Writes one row of 8 pixels into `tile` at row `y`.
    pub fn encode_row(&self, tile: &mut [u8], y: usize, row: &[ColorIdx; TILE_WIDTH]) {
        match self.format {
            Format::Planar => encode_planar(tile, y, row, self.bpp),
            Format::Interwined => encode_interwined(tile, y, row, self.bpp),
            Format::Gba => encode_gba(tile, y, row, self.bpp),
        }
    }

    pub fn decode_tile(&self, tile: &[u8]) -> Tile {
        let mut out: Tile = [[0; TILE_WIDTH]; TILE_HEIGHT];
        for y in 0..TILE_HEIGHT {
            for x in 0..TILE_WIDTH {
                out[y][x] = self.decode_pixel(tile, y, x);
            }
        }
        out
    }

    pub fn encode_tile(&self, tile: &Tile) -> Vec<u8> {
        let mut out = vec![0; self.tile_size()];
        for (y, row) in tile.iter().enumerate() {
            self.encode_row(&mut out, y, row);
        }
        out
    }
}

fn decode_planar(tile: &[u8], y: usize, x: usize, bpp: BitDepth) -> ColorIdx {
    let nbit = 7 - x as u32;
    let mut res = 0;
    for i in 0..bpp as usize {
        res = setbit(res, i as u32, getbit(tile[y + i * 8] as u64, nbit));
    }
    res as ColorIdx
}

fn decode_interwined(tile: &[u8], y: usize, x: usize, bpp: BitDepth) -> ColorIdx {
    let nbit = 7 - x as u32;
    let mut res = 0;
    let pairs = bpp as usize / 2;
    for i in 0..pairs {
        let lo = getbit(tile[i * 16 + y * 2] as u64, nbit);
        let hi = getbit(tile[i * 16 + y * 2 + 1] as u64, nbit);
        res = setbit(res, (i * 2) as u32, lo);
        res = setbit(res, (i * 2 + 1) as u32, hi);
    }
    if bpp % 2 != 0 {
        // The last plane has no partner and is stored on its own.
        let bit = getbit(tile[pairs * 16 + y] as u64, nbit);
        res = setbit(res, (pairs * 2) as u32, bit);
    }
    res as ColorIdx
}

fn decode_gba(tile: &[u8], y: usize, x: usize, bpp: BitDepth) -> ColorIdx {
    if bpp == 8 {
        tile[y * 8 + x]
    } else {
        let byte = tile[y * 4 + x / 2] as u64;
        getbits(byte, (x as u32 & 1) * 4, 4) as ColorIdx
    }
}

// Splits 8 pixels into one byte per bit-plane, leftmost pixel in the MSB.
fn planar_row_bytes(row: &[ColorIdx; TILE_WIDTH], bpp: BitDepth) -> [u8; MAX_BPP as usize] {
    let mut bytes = [0u8; MAX_BPP as usize];
    for (i, byte) in bytes.iter_mut().enumerate().take(bpp as usize) {
        let mut b = 0;
        for (c, &px) in row.iter().enumerate() {
            b = setbit(b, 7 - c as u32, getbit(px as u64, i as u32));
        }
        *byte = b as u8;
    }
    bytes
}

fn encode_planar(tile: &mut [u8], y: usize, row: &[ColorIdx; TILE_WIDTH], bpp: BitDepth) {
    let bytes = planar_row_bytes(row, bpp);
    for i in 0..bpp as usize {
        tile[y + i * 8] = bytes[i];
    }
}

fn encode_interwined(tile: &mut [u8], y: usize, row: &[ColorIdx; TILE_WIDTH], bpp: BitDepth) {
    let bytes = planar_row_bytes(row, bpp);
    let pairs = bpp as usize / 2;
    for i in 0..pairs {
        tile[i * 16 + y * 2] = bytes[i * 2];
        tile[i * 16 + y * 2 + 1] = bytes[i * 2 + 1];
    }
    if bpp % 2 != 0 {
        tile[pairs * 16 + y] = bytes[pairs * 2];
    }
}

fn encode_gba(tile: &mut [u8], y: usize, row: &[ColorIdx; TILE_WIDTH], bpp: BitDepth) {
    for (x, &px) in row.iter().enumerate() {
        if bpp == 8 {
            tile[y * 8 + x] = px;
        } else {
            let i = y * 4 + x / 2;
            tile[i] = setbits(tile[i] as u64, (x as u32 & 1) * 4, 4, px as u64) as u8;
        }
    }
}
