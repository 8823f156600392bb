//! Codecs for level descriptions, model bundles and binders
//!
//! The pipeline only talks to the three reader/writer traits below. The
//! [`NativeCodec`] implements all of them over this crate's own checksummed
//! encodings; a codec for another on-disk family plugs in through the same
//! traits.

pub mod binder;
pub mod compression;
pub mod document;
pub mod package;

use crate::core::container::Container;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A model instance placed in a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedModel {
    /// Canonical model identifier (e.g. "m004500", "o302010")
    pub model_name: String,
}

impl PlacedModel {
    pub fn new(model_name: impl Into<String>) -> Self {
        PlacedModel {
            model_name: model_name.into(),
        }
    }
}

/// Structural description of one level section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Placed static level geometry
    pub map_pieces: Vec<PlacedModel>,

    /// Placed props and objects
    pub objects: Vec<PlacedModel>,
}

/// A material and the texture paths it samples
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub texture_paths: Vec<String>,
}

/// Contents of a model bundle relevant to texture usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Materials of the bundle's model
    pub materials: Vec<Material>,

    /// Names of textures shipped inside the bundle itself
    pub embedded_textures: Vec<String>,
}

/// Reads a level's structural description
pub trait LevelReader {
    fn read_level(&self, path: &Path) -> Result<LevelLayout>;
}

/// Reads a model bundle
pub trait ModelReader {
    fn read_model(&self, path: &Path) -> Result<ModelBundle>;
}

/// Reads and writes binder header/data pairs
pub trait ContainerCodec {
    fn read_container(&self, header_path: &Path, data_path: &Path) -> Result<Container>;

    fn write_container(
        &self,
        container: &Container,
        header_path: &Path,
        data_path: &Path,
    ) -> Result<()>;
}

/// Codec over this crate's own encodings
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl LevelReader for NativeCodec {
    fn read_level(&self, path: &Path) -> Result<LevelLayout> {
        document::read_level(path)
    }
}

impl ModelReader for NativeCodec {
    fn read_model(&self, path: &Path) -> Result<ModelBundle> {
        document::read_model(path)
    }
}

impl ContainerCodec for NativeCodec {
    fn read_container(&self, header_path: &Path, data_path: &Path) -> Result<Container> {
        binder::read_binder(header_path, data_path)
    }

    fn write_container(
        &self,
        container: &Container,
        header_path: &Path,
        data_path: &Path,
    ) -> Result<()> {
        binder::write_binder(container, header_path, data_path)
    }
}
