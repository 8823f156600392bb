//! Texture packages
//!
//! Loose texture files are wrapped into binder entries named `{stem}.tpf.dcx`.
//! The payload is a one-byte compression method followed by the (possibly
//! compressed) bincode encoding of a [`TexturePackage`].

use crate::codec::compression::{compress_if_beneficial, decompress, CompressionConfig, CompressionMethod};
use crate::core::container::Entry;
use crate::core::names::{entry_name_for, stem_of};
use crate::error::{MapBinderError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Format tag for regular colour textures
pub const FORMAT_DEFAULT: u8 = 0x00;

/// Format tag for normal maps (`_n`, `_n_l`)
pub const FORMAT_NORMAL_MAP: u8 = 0x6A;

/// Format tag for baked lightmaps
pub const FORMAT_LIGHTMAP: u8 = 0x66;

/// Package flag marking a cubemap texture
pub const FLAG_CUBEMAP: u8 = 0x03;

/// Baked lightmap names produced by the level editor
const LIGHTMAP_PATTERN: &str = r"[0-9]{8}_m[0-9]{6}_gi_[0-9]{4}_[0-9]{2}_dol_[0-9]{2}";

/// A single packaged texture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexturePackage {
    pub name: String,
    pub format: u8,
    pub flags: u8,
    pub data: Vec<u8>,
}

/// Check whether a stem names a lightmap texture
pub fn is_lightmap(stem: &str) -> bool {
    stem.to_ascii_lowercase().contains("_gi_") || lightmap_regex().is_match(stem)
}

/// Format tag and flags for a texture stem
pub fn format_for(stem: &str) -> (u8, u8) {
    if stem.ends_with("_n") || stem.ends_with("_n_l") {
        (FORMAT_NORMAL_MAP, 0)
    } else if is_lightmap(stem) {
        (FORMAT_LIGHTMAP, FLAG_CUBEMAP)
    } else {
        (FORMAT_DEFAULT, 0)
    }
}

/// Package raw texture bytes under the given stem
pub fn pack_bytes(stem: &str, data: Vec<u8>, config: &CompressionConfig) -> Result<Entry> {
    let (format, flags) = format_for(stem);
    let package = TexturePackage {
        name: stem.to_string(),
        format,
        flags,
        data,
    };

    let encoded = bincode::serialize(&package)?;
    let (body, method) = compress_if_beneficial(&encoded, config)?;
    let mut payload = Vec::with_capacity(body.len() + 1);
    payload.push(method as u8);
    payload.extend_from_slice(&body);

    Ok(Entry::new(entry_name_for(stem), payload, format))
}

/// Package a loose texture file
pub fn pack_file(path: &Path, config: &CompressionConfig) -> Result<Entry> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MapBinderError::malformed(path, "texture file name is not valid UTF-8"))?;
    let data = fs::read(path)?;
    pack_bytes(stem_of(file_name), data, config)
}

/// Unwrap a packaged entry
pub fn unpack(entry: &Entry) -> Result<TexturePackage> {
    let (&method, body) = entry.payload.split_first().ok_or_else(|| {
        MapBinderError::Compression(format!("entry '{}' has an empty payload", entry.name))
    })?;
    let method = CompressionMethod::from_u8(method).ok_or_else(|| {
        MapBinderError::Compression(format!(
            "entry '{}' uses unknown compression method {}",
            entry.name, method
        ))
    })?;
    Ok(bincode::deserialize(&decompress(body, method)?)?)
}

fn lightmap_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(LIGHTMAP_PATTERN).expect("lightmap pattern is valid"))
}
