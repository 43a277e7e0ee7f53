pub type ColorIdx = u8; // Index into a palette (0 to 2^bpp - 1)
pub type BitDepth = u8; // Bits per pixel (1-8)
pub type ColorValue = u8; // One channel of a concrete color (0-255)

pub const TILES_PER_ROW: usize = 16;
pub const TILE_WIDTH: usize = 8;
pub const TILE_HEIGHT: usize = 8;
pub const ROW_SIZE: usize = TILES_PER_ROW * TILE_WIDTH;
pub const MAX_BPP: BitDepth = 8;

// Pixel indices of one 8x8 tile, indexed as [y][x].
pub type Tile = [[ColorIdx; TILE_WIDTH]; TILE_HEIGHT];

// One 128-pixel row of a decoded sheet.
pub type SheetRow = [ColorIdx; ROW_SIZE];
