//! Envelope for level descriptions and model bundles
//!
//! ```text
//! ┌──────────────┬───────────┬───────────┬───────────┬──────────────┐
//! │ magic (8)    │ major u16 │ minor u16 │ crc32 u32 │ bincode body │
//! └──────────────┴───────────┴───────────┴───────────┴──────────────┘
//! ```
//!
//! All integers are little-endian. The checksum covers the body only.

use crate::codec::{LevelLayout, ModelBundle};
use crate::error::{MapBinderError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const LEVEL_MAGIC: [u8; 8] = *b"MBLV\x00\x01\x00\x00";
pub const MODEL_MAGIC: [u8; 8] = *b"MBMD\x00\x01\x00\x00";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;

const PREAMBLE_LEN: usize = 8 + 2 + 2 + 4;

/// Serialize a document body behind its envelope
pub fn encode<T: Serialize>(magic: &[u8; 8], body: &T) -> Result<Vec<u8>> {
    let body = bincode::serialize(body)?;
    let mut bytes = Vec::with_capacity(PREAMBLE_LEN + body.len());

    bytes.extend_from_slice(magic);
    bytes.extend_from_slice(&VERSION_MAJOR.to_le_bytes());
    bytes.extend_from_slice(&VERSION_MINOR.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
    bytes.extend_from_slice(&body);

    Ok(bytes)
}

/// Validate the envelope and deserialize the body
pub fn decode<T: DeserializeOwned>(magic: &[u8; 8], bytes: &[u8], path: &Path) -> Result<T> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(MapBinderError::malformed(path, "truncated preamble"));
    }
    if &bytes[0..8] != magic {
        return Err(MapBinderError::InvalidMagic(path.to_path_buf()));
    }

    let major = u16::from_le_bytes([bytes[8], bytes[9]]);
    let minor = u16::from_le_bytes([bytes[10], bytes[11]]);
    if major != VERSION_MAJOR || minor != VERSION_MINOR {
        return Err(MapBinderError::UnsupportedVersion { major, minor });
    }

    let expected = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
    let body = &bytes[PREAMBLE_LEN..];
    if crc32fast::hash(body) != expected {
        return Err(MapBinderError::ChecksumMismatch(path.display().to_string()));
    }

    Ok(bincode::deserialize(body)?)
}

pub fn read_level(path: &Path) -> Result<LevelLayout> {
    let bytes = fs::read(path)?;
    decode(&LEVEL_MAGIC, &bytes, path)
}

pub fn write_level(path: &Path, level: &LevelLayout) -> Result<()> {
    fs::write(path, encode(&LEVEL_MAGIC, level)?)?;
    Ok(())
}

pub fn read_model(path: &Path) -> Result<ModelBundle> {
    let bytes = fs::read(path)?;
    decode(&MODEL_MAGIC, &bytes, path)
}

pub fn write_model(path: &Path, model: &ModelBundle) -> Result<()> {
    fs::write(path, encode(&MODEL_MAGIC, model)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Material, PlacedModel};
    use tempfile::TempDir;

    #[test]
    fn test_level_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m30_00_00_00.msb.dcx");
        let level = LevelLayout {
            map_pieces: vec![PlacedModel::new("m000100")],
            objects: vec![PlacedModel::new("o302010")],
        };

        write_level(&path, &level).unwrap();
        assert_eq!(read_level(&path).unwrap(), level);
    }

    #[test]
    fn test_wrong_magic_is_rejected() {
        let model = ModelBundle {
            materials: vec![Material {
                name: "mat".into(),
                texture_paths: vec!["a.tga".into()],
            }],
            embedded_textures: vec![],
        };
        let bytes = encode(&MODEL_MAGIC, &model).unwrap();

        let err = decode::<LevelLayout>(&LEVEL_MAGIC, &bytes, Path::new("x")).unwrap_err();
        assert!(matches!(err, MapBinderError::InvalidMagic(_)));
    }

    #[test]
    fn test_corrupted_body_fails_checksum() {
        let mut bytes = encode(&LEVEL_MAGIC, &LevelLayout::default()).unwrap();
        bytes.push(0xFF);

        let err = decode::<LevelLayout>(&LEVEL_MAGIC, &bytes, Path::new("x")).unwrap_err();
        assert!(matches!(err, MapBinderError::ChecksumMismatch(_)));
    }

    #[test]
    fn test_truncated_and_future_version() {
        let err = decode::<LevelLayout>(&LEVEL_MAGIC, b"MBLV", Path::new("x")).unwrap_err();
        assert!(matches!(err, MapBinderError::Malformed { .. }));

        let mut bytes = encode(&LEVEL_MAGIC, &LevelLayout::default()).unwrap();
        bytes[8] = 9;
        let err = decode::<LevelLayout>(&LEVEL_MAGIC, &bytes, Path::new("x")).unwrap_err();
        assert!(matches!(
            err,
            MapBinderError::UnsupportedVersion { major: 9, .. }
        ));
    }
}
