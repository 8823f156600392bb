//! Run configuration
//!
//! Everything a run needs is carried in an explicit [`RepackConfig`], loaded
//! from TOML and/or assembled by the CLI, then handed to each component.
//!
//! ```toml
//! level = "30_0"
//! mod_root = "C:/mods/my-mod"
//! game_root = "C:/game/Data"
//! loose_texture_dir = "C:/mods/my-mod/YarrTools/dds"
//! use_patch = false
//!
//! [balance]
//! tolerance = 500000
//! ```

use crate::codec::compression::CompressionConfig;
use crate::core::balance::BalanceConfig;
use crate::core::pool::DEFAULT_PEER_COUNT;
use crate::error::{MapBinderError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Map and block number of a level section (e.g. `30_0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LevelId {
    pub map: u8,
    pub block: u8,
}

impl LevelId {
    /// Accepted form: two-digit map, underscore, one-digit block
    const PATTERN: &'static str = r"^(\d\d)_(\d)$";

    pub fn new(map: u8, block: u8) -> Self {
        LevelId { map, block }
    }

    /// `m30`
    pub fn map_prefix(&self) -> String {
        format!("m{:02}", self.map)
    }

    /// `m30_00_00_00`
    pub fn section_name(&self) -> String {
        format!("m{:02}_{:02}_00_00", self.map, self.block)
    }
}

impl FromStr for LevelId {
    type Err = MapBinderError;

    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(Self::PATTERN).map_err(|e| MapBinderError::Config(e.to_string()))?;
        let caps = re
            .captures(s.trim())
            .ok_or_else(|| MapBinderError::InvalidLevelId(s.to_string()))?;
        let map = caps[1]
            .parse()
            .map_err(|_| MapBinderError::InvalidLevelId(s.to_string()))?;
        let block = caps[2]
            .parse()
            .map_err(|_| MapBinderError::InvalidLevelId(s.to_string()))?;
        Ok(LevelId { map, block })
    }
}

impl TryFrom<String> for LevelId {
    type Error = MapBinderError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LevelId> for String {
    fn from(id: LevelId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}_{}", self.map, self.block)
    }
}

fn default_peer_count() -> usize {
    DEFAULT_PEER_COUNT
}

fn default_true() -> bool {
    true
}

fn default_threads() -> usize {
    1
}

/// Options for one repack run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepackConfig {
    /// Level section to repack
    pub level: LevelId,

    /// Root of the customized layer (holds `map/` and `obj/`)
    pub mod_root: PathBuf,

    /// Root of the base game layer; no base layer is consulted when unset
    #[serde(default)]
    pub game_root: Option<PathBuf>,

    /// Directory of loose `.dds` textures to package into the level
    #[serde(default)]
    pub loose_texture_dir: Option<PathBuf>,

    /// Number of peer binders per level
    #[serde(default = "default_peer_count")]
    pub peer_count: usize,

    #[serde(default)]
    pub balance: BalanceConfig,

    #[serde(default)]
    pub compression: CompressionConfig,

    /// Write peer binders as `.patch` overlays
    #[serde(default)]
    pub use_patch: bool,

    /// Write the lightmap binder as a `.patch` overlay
    #[serde(default)]
    pub use_patch_env: bool,

    /// Copy used textures out of the base layer's peer binders
    #[serde(default = "default_true")]
    pub include_base_textures: bool,

    /// Copy used lightmaps out of the base layer's lightmap binder
    #[serde(default = "default_true")]
    pub include_base_lightmaps: bool,

    /// Keep `.bak` copies of binders before they are rewritten
    #[serde(default)]
    pub create_backups: bool,

    /// Worker threads for model bundle scanning
    #[serde(default = "default_threads")]
    pub resolve_threads: usize,
}

impl RepackConfig {
    pub fn new(level: LevelId, mod_root: impl Into<PathBuf>) -> Self {
        RepackConfig {
            level,
            mod_root: mod_root.into(),
            game_root: None,
            loose_texture_dir: None,
            peer_count: DEFAULT_PEER_COUNT,
            balance: BalanceConfig::default(),
            compression: CompressionConfig::default(),
            use_patch: false,
            use_patch_env: false,
            include_base_textures: true,
            include_base_lightmaps: true,
            create_backups: false,
            resolve_threads: 1,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RepackConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.peer_count == 0 {
            return Err(MapBinderError::Config(
                "peer_count must be at least 1".to_string(),
            ));
        }
        if self.peer_count > 10 {
            return Err(MapBinderError::Config(format!(
                "peer_count {} does not fit the single-digit binder naming",
                self.peer_count
            )));
        }
        if self.mod_root.as_os_str().is_empty() {
            return Err(MapBinderError::Config("mod_root cannot be empty".to_string()));
        }
        if self.resolve_threads == 0 {
            return Err(MapBinderError::Config(
                "resolve_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether base-layer peer textures are copied this run
    ///
    /// Patch overlays load on top of the game's own binders, so base textures
    /// are never copied into them.
    pub fn copies_base_textures(&self) -> bool {
        self.include_base_textures && !self.use_patch && self.game_root.is_some()
    }

    /// Whether base-layer lightmaps are copied this run
    pub fn copies_base_lightmaps(&self) -> bool {
        self.include_base_lightmaps && !self.use_patch_env && self.game_root.is_some()
    }

    pub fn with_game_root(mut self, game_root: impl Into<PathBuf>) -> Self {
        self.game_root = Some(game_root.into());
        self
    }

    pub fn with_loose_textures(mut self, dir: impl Into<PathBuf>) -> Self {
        self.loose_texture_dir = Some(dir.into());
        self
    }

    pub fn with_balance(mut self, balance: BalanceConfig) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_patch(mut self, use_patch: bool, use_patch_env: bool) -> Self {
        self.use_patch = use_patch;
        self.use_patch_env = use_patch_env;
        self
    }

    pub fn with_backups(mut self, create_backups: bool) -> Self {
        self.create_backups = create_backups;
        self
    }

    pub fn with_resolve_threads(mut self, threads: usize) -> Self {
        self.resolve_threads = threads;
        self
    }
}
