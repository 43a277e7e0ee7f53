use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::BitDepth;

/// Byte layout of packed tile data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Each pixel's value is split over bit-planes: the nth plane collects
    /// the nth bit of every pixel, one byte per tile row, plane after plane.
    Planar,
    /// SNES layout: planes stored in pairs, the two bytes of a pair
    /// interleaved row by row.
    Interwined,
    /// GBA layout: at 4bpp two pixels per byte (left pixel in the low nibble),
    /// at 8bpp one pixel per byte.
    Gba,
}

const ALL_BPPS: [BitDepth; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
const GBA_BPPS: [BitDepth; 2] = [4, 8];

impl Format {
    pub const ALL: [Format; 3] = [Format::Planar, Format::Interwined, Format::Gba];

    pub fn name(self) -> &'static str {
        match self {
            Format::Planar => "planar",
            Format::Interwined => "interwined",
            Format::Gba => "gba",
        }
    }

    pub fn from_name(name: &str) -> Option<Format> {
        Format::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn supported_bpps(self) -> &'static [BitDepth] {
        match self {
            Format::Planar | Format::Interwined => &ALL_BPPS,
            Format::Gba => &GBA_BPPS,
        }
    }

    pub fn supports(self, bpp: BitDepth) -> bool {
        self.supported_bpps().contains(&bpp)
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())?;
        Ok(())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_name(s).ok_or_else(|| {
            let names: Vec<&str> = Format::ALL.iter().map(|f| f.name()).collect();
            format!("unknown format '{}' (expected one of: {})", s, names.join(", "))
        })
    }
}

/// Shortcuts for the native tile format of a console.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Nes,
    Snes,
    Gb,
    Gba,
}

impl Preset {
    pub fn format(self) -> Format {
        match self {
            Preset::Nes => Format::Planar,
            Preset::Snes | Preset::Gb => Format::Interwined,
            Preset::Gba => Format::Gba,
        }
    }

    pub fn bpp(self) -> BitDepth {
        match self {
            Preset::Nes | Preset::Gb => 2,
            Preset::Snes | Preset::Gba => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for f in Format::ALL {
            assert_eq!(Format::from_name(f.name()), Some(f));
            assert_eq!(f.to_string().parse::<Format>(), Ok(f));
        }
        assert_eq!(Format::from_name("GBA"), None);
        assert!("chunky".parse::<Format>().unwrap_err().contains("interwined"));
    }

    #[test]
    fn bpp_support() {
        for bpp in 1..=8 {
            assert!(Format::Planar.supports(bpp));
            assert!(Format::Interwined.supports(bpp));
        }
        assert!(!Format::Planar.supports(0));
        assert!(!Format::Planar.supports(9));
        assert_eq!(Format::Gba.supported_bpps(), &[4, 8]);
        assert!(!Format::Gba.supports(2));
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&Format::Gba).unwrap(), "\"gba\"");
        let f: Format = serde_json::from_str("\"interwined\"").unwrap();
        assert_eq!(f, Format::Interwined);
    }

    #[test]
    fn presets() {
        assert_eq!((Preset::Nes.format(), Preset::Nes.bpp()), (Format::Planar, 2));
        assert_eq!((Preset::Snes.format(), Preset::Snes.bpp()), (Format::Interwined, 4));
        assert_eq!((Preset::Gb.format(), Preset::Gb.bpp()), (Format::Interwined, 2));
        assert_eq!((Preset::Gba.format(), Preset::Gba.bpp()), (Format::Gba, 4));
        for p in [Preset::Nes, Preset::Snes, Preset::Gb, Preset::Gba] {
            assert!(p.format().supports(p.bpp()));
        }
    }
}
