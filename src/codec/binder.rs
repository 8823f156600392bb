//! Binder header/data pairs
//!
//! A binder is stored as two files:
//!
//! ```text
//! header (.tpfbhd)
//! ┌──────────────┬───────────┬───────────┬──────────────────────────────┐
//! │ magic (8)    │ major u16 │ minor u16 │ bincode Vec<EntryRecord>     │
//! └──────────────┴───────────┴───────────┴──────────────────────────────┘
//!
//! data (.tpfbdt)
//! ┌──────────┬──────────┬─────┐
//! │ payload0 │ payload1 │ ... │   offsets and lengths come from the header
//! └──────────┴──────────┴─────┘
//! ```
//!
//! An empty data file is read as an empty binder whatever the header says.
//!
//! Writes go to `.tmp` siblings first and are renamed into place, data before
//! header, so an interrupted write never leaves a header describing data that
//! is not on disk.

use crate::core::container::{Container, Entry};
use crate::error::{MapBinderError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MAGIC: [u8; 8] = *b"MBHD\x00\x01\x00\x00";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;

const PREAMBLE_LEN: usize = 12;

/// Header record describing one entry in the data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: u32,
    pub name: String,
    pub offset: u64,
    pub length: u64,
    pub format_tag: u8,
    pub crc32: u32,
}

/// Parsed binder header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderHeader {
    pub version_major: u16,
    pub version_minor: u16,
    pub records: Vec<EntryRecord>,
}

impl BinderHeader {
    /// Build the header and data blob for a container
    pub fn for_container(container: &Container) -> (Self, Vec<u8>) {
        let mut data = Vec::with_capacity(container.size() as usize);
        let records = container
            .entries()
            .iter()
            .map(|entry| {
                let offset = data.len() as u64;
                data.extend_from_slice(&entry.payload);
                EntryRecord {
                    id: entry.id,
                    name: entry.name.clone(),
                    offset,
                    length: entry.len(),
                    format_tag: entry.format_tag,
                    crc32: crc32fast::hash(&entry.payload),
                }
            })
            .collect();

        let header = BinderHeader {
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            records,
        };
        (header, data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(&self.records)?;
        let mut bytes = Vec::with_capacity(PREAMBLE_LEN + body.len());

        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&self.version_major.to_le_bytes());
        bytes.extend_from_slice(&self.version_minor.to_le_bytes());
        bytes.extend_from_slice(&body);

        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        if bytes.len() < PREAMBLE_LEN {
            return Err(MapBinderError::malformed(path, "truncated binder header"));
        }
        if bytes[0..8] != MAGIC {
            return Err(MapBinderError::InvalidMagic(path.to_path_buf()));
        }

        let version_major = u16::from_le_bytes([bytes[8], bytes[9]]);
        let version_minor = u16::from_le_bytes([bytes[10], bytes[11]]);
        if version_major != VERSION_MAJOR || version_minor != VERSION_MINOR {
            return Err(MapBinderError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let records = bincode::deserialize(&bytes[PREAMBLE_LEN..])?;
        Ok(BinderHeader {
            version_major,
            version_minor,
            records,
        })
    }

    /// Slice every record out of `data`, verifying bounds and checksums
    pub fn entries_from(&self, data: &[u8], path: &Path) -> Result<Vec<Entry>> {
        self.records
            .iter()
            .map(|record| {
                let start = usize::try_from(record.offset)
                    .map_err(|_| MapBinderError::malformed(path, "entry offset overflow"))?;
                let end = usize::try_from(record.length)
                    .ok()
                    .and_then(|len| start.checked_add(len))
                    .filter(|&end| end <= data.len())
                    .ok_or_else(|| {
                        MapBinderError::malformed(
                            path,
                            format!("entry '{}' lies outside the data file", record.name),
                        )
                    })?;

                let payload = &data[start..end];
                if crc32fast::hash(payload) != record.crc32 {
                    return Err(MapBinderError::ChecksumMismatch(record.name.clone()));
                }
                Ok(Entry::new(
                    record.name.clone(),
                    payload.to_vec(),
                    record.format_tag,
                ))
            })
            .collect()
    }
}

/// Read a binder from its header/data pair
pub fn read_binder(header_path: &Path, data_path: &Path) -> Result<Container> {
    let data = fs::read(data_path)?;
    if data.is_empty() {
        debug!("Empty data file {:?}, starting from an empty binder", data_path);
        return Ok(Container::new());
    }

    let header = BinderHeader::from_bytes(&fs::read(header_path)?, header_path)?;
    let entries = header.entries_from(&data, data_path)?;

    debug!("Read {} entries from {:?}", entries.len(), header_path);
    Ok(Container::from_entries(entries))
}

/// Write a binder to its header/data pair, replacing existing files
pub fn write_binder(container: &Container, header_path: &Path, data_path: &Path) -> Result<()> {
    let (header, data) = BinderHeader::for_container(container);
    let header_tmp = temp_path(header_path);
    let data_tmp = temp_path(data_path);

    let staged = fs::write(&header_tmp, header.to_bytes()?)
        .and_then(|_| fs::write(&data_tmp, data))
        .and_then(|_| fs::rename(&data_tmp, data_path))
        .and_then(|_| fs::rename(&header_tmp, header_path));
    if let Err(e) = staged {
        let _ = fs::remove_file(&header_tmp);
        let _ = fs::remove_file(&data_tmp);
        return Err(e.into());
    }

    debug!(
        "Wrote {} entries ({} bytes) to {:?}",
        container.len(),
        container.size(),
        header_path
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
