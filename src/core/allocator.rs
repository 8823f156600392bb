//! Pruning and lookup across containers
//!
//! The usage set is the only oracle: an entry survives a prune exactly when
//! its base identifier is a member.

use crate::core::container::Container;
use crate::core::pool::ContainerPool;
use crate::core::usage::UsedAssetSet;
use tracing::debug;

/// Location of an entry inside a pool: `(container index, entry id)`
pub type EntryLocation = (usize, u32);

/// Removes unreferenced entries and locates entries by base identifier
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerAllocator;

impl ContainerAllocator {
    pub fn new() -> Self {
        ContainerAllocator
    }

    /// Drop every entry the level does not use and return the bytes reclaimed
    pub fn prune(&self, container: &mut Container, used: &UsedAssetSet) -> u64 {
        let before = container.len();
        let reclaimed = container.retain_entries(|entry| used.keeps_entry(&entry.name));
        debug!(
            "Pruned {} of {} entries ({} bytes)",
            before - container.len(),
            before,
            reclaimed
        );
        reclaimed
    }

    /// Prune every container in the pool
    pub fn prune_pool(&self, pool: &mut ContainerPool, used: &UsedAssetSet) -> u64 {
        pool.iter_mut().map(|c| self.prune(c, used)).sum()
    }

    /// Bytes a prune would reclaim, without touching the container
    pub fn unused_bytes(&self, container: &Container, used: &UsedAssetSet) -> u64 {
        container
            .entries()
            .iter()
            .filter(|e| !used.keeps_entry(&e.name))
            .map(|e| e.len())
            .sum()
    }

    /// First entry whose base identifier matches, in pool order then entry order
    pub fn locate(&self, pool: &ContainerPool, base: &str) -> Option<EntryLocation> {
        pool.containers()
            .iter()
            .enumerate()
            .find_map(|(ci, c)| c.position_of_base(base).map(|ei| (ci, c.entries()[ei].id)))
    }
}
