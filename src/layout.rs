//! On-disk layout of an asset layer
//!
//! ```text
//! {root}/map/MapStudio/m30_00_00_00.msb.dcx      level description
//! {root}/map/m30_00_00_00/*bnd.dcx               map-piece bundles
//! {root}/obj/*bnd.dcx                            object bundles
//! {root}/map/m30/m30_000{0..3}.tpfbhd|.tpfbdt    peer binders
//! {root}/map/m30/gi_env_m30.tpfbhd|.tpfbdt       lightmap binder
//! ```
//!
//! Any binder may also exist as a `.patch` overlay, which wins at load time.
//! A missing directory or file is never an error here: the layer simply
//! contributes nothing.

use crate::config::LevelId;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const BUNDLE_SUFFIX: &str = "bnd.dcx";
const LEVEL_SUFFIX: &str = ".msb.dcx";
const STUDIO_DIR_SUFFIX: &str = "mapstudio";
const HEADER_EXTENSION: &str = "tpfbhd";
const DATA_EXTENSION: &str = "tpfbdt";
const PATCH_EXTENSION: &str = "patch";
const BACKUP_EXTENSION: &str = "bak";

/// Digits of a map-piece id inside a bundle file name
const MAP_PIECE_DIGITS: usize = 6;

/// Length of an object model id (`o302010`)
const OBJECT_ID_LEN: usize = 7;

/// Header/data file pair of one binder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderPaths {
    pub header: PathBuf,
    pub data: PathBuf,
}

impl BinderPaths {
    fn new(dir: &Path, stem: &str) -> Self {
        BinderPaths {
            header: dir.join(format!("{}.{}", stem, HEADER_EXTENSION)),
            data: dir.join(format!("{}.{}", stem, DATA_EXTENSION)),
        }
    }

    /// `.patch` overlay of this pair
    pub fn patch(&self) -> Self {
        self.with_extension(PATCH_EXTENSION)
    }

    /// `.bak` copies of this pair
    pub fn backup(&self) -> Self {
        self.with_extension(BACKUP_EXTENSION)
    }

    /// Both files are present
    pub fn exists(&self) -> bool {
        self.header.is_file() && self.data.is_file()
    }

    /// Pair to load: the overlay if present, otherwise the plain pair
    pub fn existing(&self) -> Option<Self> {
        let patch = self.patch();
        if patch.exists() {
            Some(patch)
        } else if self.exists() {
            Some(self.clone())
        } else {
            None
        }
    }

    /// Pair to write: the overlay or the plain pair
    pub fn target(&self, use_patch: bool) -> Self {
        if use_patch {
            self.patch()
        } else {
            self.clone()
        }
    }

    fn with_extension(&self, extension: &str) -> Self {
        BinderPaths {
            header: append_extension(&self.header, extension),
            data: append_extension(&self.data, extension),
        }
    }
}

/// One asset layer rooted at a game or mod directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayer {
    root: PathBuf,
}

impl AssetLayer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AssetLayer { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn map_dir(&self) -> PathBuf {
        self.root.join("map")
    }

    pub fn obj_dir(&self) -> PathBuf {
        self.root.join("obj")
    }

    /// Level description file, if the layer has one
    pub fn level_file(&self, level: LevelId) -> Option<PathBuf> {
        let studio = list_entries(&self.map_dir()).into_iter().find(|path| {
            path.is_dir() && lower_file_name(path).ends_with(STUDIO_DIR_SUFFIX)
        })?;
        let wanted = format!("{}{}", level.section_name(), LEVEL_SUFFIX);
        list_entries(&studio)
            .into_iter()
            .find(|path| path.is_file() && lower_file_name(path) == wanted)
    }

    /// Directory holding the level section's map-piece bundles
    pub fn map_piece_dir(&self, level: LevelId) -> PathBuf {
        self.map_dir().join(level.section_name())
    }

    /// Map-piece bundles of a level section as `(model name, path)`
    ///
    /// `m30_00_00_00_004500.mapbnd.dcx` holds model `m004500`.
    pub fn map_piece_bundles(&self, level: LevelId) -> Vec<(String, PathBuf)> {
        let id_start = level.section_name().len() + 1;
        bundle_files(&self.map_piece_dir(level))
            .into_iter()
            .filter_map(|path| {
                let name = file_name(&path)?;
                let digits = name.get(id_start..id_start + MAP_PIECE_DIGITS)?;
                Some((format!("m{}", digits), path))
            })
            .collect()
    }

    /// Object bundles as `(model name, path)`; `o302010.objbnd.dcx` holds `o302010`
    pub fn object_bundles(&self) -> Vec<(String, PathBuf)> {
        bundle_files(&self.obj_dir())
            .into_iter()
            .filter_map(|path| {
                let id = file_name(&path)?.get(..OBJECT_ID_LEN)?.to_string();
                Some((id, path))
            })
            .collect()
    }

    /// Object ids with any file present in the layer's object directory
    pub fn object_ids(&self) -> Vec<String> {
        list_entries(&self.obj_dir())
            .iter()
            .filter(|path| path.is_file())
            .filter_map(|path| Some(file_name(path)?.get(..OBJECT_ID_LEN)?.to_string()))
            .collect()
    }

    /// Directory of the level's binders (`map/m30`)
    pub fn texture_dir(&self, level: LevelId) -> PathBuf {
        self.map_dir().join(level.map_prefix())
    }

    /// Peer binder `index` (`m30_0000` .. `m30_0003`)
    pub fn peer_binder(&self, level: LevelId, index: usize) -> BinderPaths {
        BinderPaths::new(
            &self.texture_dir(level),
            &format!("{}_{:04}", level.map_prefix(), index),
        )
    }

    /// Lightmap binder (`gi_env_m30`)
    pub fn lightmap_binder(&self, level: LevelId) -> BinderPaths {
        BinderPaths::new(
            &self.texture_dir(level),
            &format!("gi_env_{}", level.map_prefix()),
        )
    }
}

/// Loose `.dds` textures in a directory, sorted by path
pub fn loose_textures(dir: &Path) -> Vec<PathBuf> {
    list_entries(dir)
        .into_iter()
        .filter(|path| path.is_file() && lower_file_name(path).ends_with(".dds"))
        .collect()
}

fn bundle_files(dir: &Path) -> Vec<PathBuf> {
    list_entries(dir)
        .into_iter()
        .filter(|path| path.is_file() && lower_file_name(path).ends_with(BUNDLE_SUFFIX))
        .collect()
}

/// Directory entries sorted by path; empty when the directory is unreadable
fn list_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    paths
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn lower_file_name(path: &Path) -> String {
    file_name(path).unwrap_or_default().to_ascii_lowercase()
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
