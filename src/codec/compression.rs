//! Payload compression for packaged textures
//!
//! - Compression threshold: data below `threshold` bytes is stored raw
//! - Fallback: stored raw if the compressed/original ratio is not below `min_ratio`
//! - The method actually used is recorded by the caller next to the bytes

use crate::error::{MapBinderError, Result};
use serde::{Deserialize, Serialize};

/// Largest payload accepted when inflating a zstd frame (256MB)
const ZSTD_MAX_DECOMPRESSED: usize = 256 * 1024 * 1024;

/// Compression method for texture packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CompressionMethod {
    /// No compression
    None = 0,
    /// LZ4 compression (fast, moderate ratio)
    Lz4 = 1,
    /// Zstd compression (slower, better ratio)
    Zstd = 2,
}

impl CompressionMethod {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionMethod::None),
            1 => Some(CompressionMethod::Lz4),
            2 => Some(CompressionMethod::Zstd),
            _ => None,
        }
    }
}

/// Compression configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Compression method to use
    pub method: CompressionMethod,

    /// Data smaller than this is not compressed
    pub threshold: usize,

    /// Maximum compressed/original ratio worth keeping
    pub min_ratio: f32,

    /// Zstd level
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig::zstd()
    }
}

impl CompressionConfig {
    pub fn none() -> Self {
        CompressionConfig {
            method: CompressionMethod::None,
            threshold: usize::MAX,
            min_ratio: 0.0,
            level: 0,
        }
    }

    pub fn lz4() -> Self {
        CompressionConfig {
            method: CompressionMethod::Lz4,
            threshold: 512,
            min_ratio: 0.9,
            level: 0,
        }
    }

    pub fn zstd() -> Self {
        CompressionConfig {
            method: CompressionMethod::Zstd,
            threshold: 1024,
            min_ratio: 0.85,
            level: 9,
        }
    }
}

/// Compress data using the specified method
pub fn compress(data: &[u8], method: CompressionMethod, level: i32) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::None => Ok(data.to_vec()),
        CompressionMethod::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionMethod::Zstd => zstd::bulk::compress(data, level)
            .map_err(|e| MapBinderError::Compression(format!("Zstd compression failed: {}", e))),
    }
}

/// Decompress data using the specified method
pub fn decompress(data: &[u8], method: CompressionMethod) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::None => Ok(data.to_vec()),
        CompressionMethod::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| MapBinderError::Compression(format!("LZ4 decompression failed: {}", e))),
        CompressionMethod::Zstd => zstd::bulk::decompress(data, ZSTD_MAX_DECOMPRESSED)
            .map_err(|e| MapBinderError::Compression(format!("Zstd decompression failed: {}", e))),
    }
}

/// Compress data if beneficial, returns (data, method_used)
pub fn compress_if_beneficial(
    data: &[u8],
    config: &CompressionConfig,
) -> Result<(Vec<u8>, CompressionMethod)> {
    if data.len() < config.threshold || config.method == CompressionMethod::None {
        return Ok((data.to_vec(), CompressionMethod::None));
    }

    let compressed = compress(data, config.method, config.level)?;
    let ratio = compressed.len() as f32 / data.len() as f32;
    if ratio < config.min_ratio {
        Ok((compressed, config.method))
    } else {
        Ok((data.to_vec(), CompressionMethod::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        assert_eq!(CompressionMethod::from_u8(1), Some(CompressionMethod::Lz4));
        assert_eq!(CompressionMethod::from_u8(2), Some(CompressionMethod::Zstd));
        assert_eq!(CompressionMethod::from_u8(42), None);
    }

    #[test]
    fn test_lz4_and_zstd_shrink_repetitive_data() {
        let data = b"DXT5 block ".repeat(200);
        for method in [CompressionMethod::Lz4, CompressionMethod::Zstd] {
            let packed = compress(&data, method, 3).unwrap();
            assert!(packed.len() < data.len());
            assert_eq!(decompress(&packed, method).unwrap(), data);
        }
    }

    #[test]
    fn test_small_data_stays_raw() {
        let (out, method) = compress_if_beneficial(b"tiny", &CompressionConfig::lz4()).unwrap();
        assert_eq!(method, CompressionMethod::None);
        assert_eq!(out, b"tiny");
    }

    #[test]
    fn test_method_names_in_config() {
        let config: CompressionConfig = toml::from_str("method = \"lz4\"").unwrap();
        assert_eq!(config.method, CompressionMethod::Lz4);
        assert_eq!(config.level, 9);
    }
}
