use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    common::BitDepth,
    format::{Format, Preset},
    persist,
};

pub const DEFAULT_BPP: BitDepth = 2;
pub const DEFAULT_FORMAT: Format = Format::Planar;

/// Defaults applied when the command line leaves a setting open.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    pub bpp: Option<BitDepth>,
    pub format: Option<Format>,
    pub palette: Option<PathBuf>,
}

pub fn get_global_config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "chr_convert")
        .context("Unable to open global config directory.")?;
    let config_dir = project_dirs.config_dir();
    let config_path = config_dir.join("config.json");
    Ok(config_path)
}

pub fn load_global_config(path: &Path) -> Result<GlobalConfig> {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(GlobalConfig::default());
    }
    persist::load_json(path)
}

/// The (format, bpp) pair to convert with. Explicit settings win over the
/// preset, which wins over the config file.
pub fn resolve_settings(
    bpp: Option<BitDepth>,
    format: Option<Format>,
    preset: Option<Preset>,
    config: &GlobalConfig,
) -> (Format, BitDepth) {
    let format = format
        .or(preset.map(Preset::format))
        .or(config.format)
        .unwrap_or(DEFAULT_FORMAT);
    let bpp = bpp
        .or(preset.map(Preset::bpp))
        .or(config.bpp)
        .unwrap_or(DEFAULT_BPP);
    (format, bpp)
}
