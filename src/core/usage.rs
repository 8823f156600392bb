//! Texture usage sets and model references

use crate::core::names::{base_identifier, low_detail_of};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Kind of placed model in a level description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Static level geometry
    MapPiece,
    /// Placed prop / object
    Object,
}

/// A model placed somewhere in a level
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference {
    pub name: String,
    pub kind: ModelKind,
}

impl ModelReference {
    pub fn map_piece(name: impl Into<String>) -> Self {
        ModelReference {
            name: name.into(),
            kind: ModelKind::MapPiece,
        }
    }

    pub fn object(name: impl Into<String>) -> Self {
        ModelReference {
            name: name.into(),
            kind: ModelKind::Object,
        }
    }
}

/// Set of texture stems a level needs
///
/// Every base identifier is stored alongside its low-detail stem, so a plain
/// membership test on an entry's base identifier decides whether it is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedAssetSet {
    stems: AHashSet<String>,
}

impl UsedAssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a texture as used, together with its low-detail pair
    pub fn insert_texture(&mut self, base: &str) {
        self.stems.insert(low_detail_of(base));
        self.stems.insert(base.to_string());
    }

    /// Check a raw stem (`a` or `a_l`)
    pub fn contains(&self, stem: &str) -> bool {
        self.stems.contains(stem)
    }

    /// Check whether an entry should be kept, judged by its base identifier
    pub fn keeps_entry(&self, entry_name: &str) -> bool {
        self.stems.contains(base_identifier(entry_name))
    }

    pub fn union_with(&mut self, other: UsedAssetSet) {
        self.stems.extend(other.stems);
    }

    pub fn difference_with(&mut self, other: &UsedAssetSet) {
        self.stems.retain(|s| !other.stems.contains(s));
    }

    /// Number of stems, low-detail variants included
    pub fn len(&self) -> usize {
        self.stems.len()
    }

    /// Number of textures, low-detail variants not counted
    pub fn texture_count(&self) -> usize {
        self.stems
            .iter()
            .filter(|s| !crate::core::names::is_low_detail(s))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stems.iter().map(String::as_str)
    }
}

impl FromIterator<String> for UsedAssetSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = UsedAssetSet::new();
        for base in iter {
            set.insert_texture(&base);
        }
        set
    }
}
