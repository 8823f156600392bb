//! End-to-end repack of one level
//!
//! ```text
//! resolve usage ──► load binders ──► prune ──► level ──► loose textures ──► base textures ──► write
//! ```
//!
//! All container mutation happens in memory. Nothing is written until every
//! earlier phase has succeeded, so a failed run leaves the binders untouched
//! (apart from `.bak` copies, which are taken before anything changes).

use crate::codec::package;
use crate::codec::{ContainerCodec, LevelReader, ModelReader, NativeCodec};
use crate::config::RepackConfig;
use crate::core::allocator::ContainerAllocator;
use crate::core::balance::BalanceScheduler;
use crate::core::container::Container;
use crate::core::names::stem_of;
use crate::core::planner::{Placement, TransferPlanner};
use crate::core::pool::ContainerPool;
use crate::core::resolver::UsageResolver;
use crate::core::usage::UsedAssetSet;
use crate::error::Result;
use crate::layout::{self, AssetLayer, BinderPaths};
use serde::Serialize;
use std::fs;
use tracing::{debug, info};

/// Counters describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepackReport {
    /// Level section that was repacked
    pub level: String,

    /// Distinct textures the level uses, low-detail variants not counted
    pub used_textures: usize,

    /// Bytes removed from existing binders
    pub bytes_reclaimed: u64,

    /// Transfers made while leveling the peer binders
    pub balance_moves: usize,

    /// Loose textures packaged into the level
    pub loose_transferred: usize,

    /// Entries copied from the base layer's binders
    pub base_transferred: usize,

    /// Bytes of base-layer entries the level does not use
    pub base_unused_bytes: u64,

    /// Binder pairs written to disk
    pub binders_written: usize,

    /// Final peer binder sizes, in pool order
    pub peer_sizes: Vec<u64>,

    /// Final lightmap binder size
    pub lightmap_size: u64,
}

impl RepackReport {
    /// Pretty-printed JSON form of the report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the repack pipeline for one configuration
pub struct Repacker<C = NativeCodec> {
    config: RepackConfig,
    codec: C,
}

impl Repacker<NativeCodec> {
    pub fn new(config: RepackConfig) -> Self {
        Repacker {
            config,
            codec: NativeCodec,
        }
    }
}

impl<C> Repacker<C>
where
    C: LevelReader + ModelReader + ContainerCodec + Sync,
{
    pub fn with_codec(config: RepackConfig, codec: C) -> Self {
        Repacker { config, codec }
    }

    pub fn config(&self) -> &RepackConfig {
        &self.config
    }

    pub fn run(&self) -> Result<RepackReport> {
        self.config.validate()?;
        let level = self.config.level;
        let customized = AssetLayer::new(&self.config.mod_root);
        let base = self.config.game_root.as_ref().map(AssetLayer::new);

        info!("Searching for textures used by level {}", level);
        let used = UsageResolver::new(&self.codec)
            .with_threads(self.config.resolve_threads)
            .resolve(&customized, base.as_ref(), level)?;

        let mut report = RepackReport {
            level: level.to_string(),
            used_textures: used.texture_count(),
            ..Default::default()
        };

        let mut pool = self.load_pool(&customized)?;
        let mut lightmaps = self.load_binder(&customized.lightmap_binder(level))?;

        let allocator = ContainerAllocator::new();
        report.bytes_reclaimed =
            allocator.prune_pool(&mut pool, &used) + allocator.prune(&mut lightmaps, &used);
        info!(
            "Removed approximately {} KB of unused textures",
            report.bytes_reclaimed / 1000
        );

        report.balance_moves = BalanceScheduler::new(self.config.balance).level_pool(&mut pool);

        report.loose_transferred = self.transfer_loose(&used, &mut pool, &mut lightmaps)?;
        info!("Packaged {} loose textures", report.loose_transferred);

        if let Some(base) = &base {
            let (transferred, unused) =
                self.transfer_base(base, &used, &mut pool, &mut lightmaps)?;
            report.base_transferred = transferred;
            report.base_unused_bytes = unused;
            info!(
                "Copied {} base textures; approximately {} KB of base textures were unused",
                transferred,
                unused / 1000
            );
        }

        report.binders_written = self.write_all(&customized, &pool, &lightmaps)?;
        report.peer_sizes = pool.sizes();
        report.lightmap_size = lightmaps.size();

        info!("Texture transfer complete for level {}", level);
        Ok(report)
    }

    fn load_pool(&self, layer: &AssetLayer) -> Result<ContainerPool> {
        let containers = (0..self.config.peer_count)
            .map(|i| self.load_binder(&layer.peer_binder(self.config.level, i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ContainerPool::from_containers(containers))
    }

    /// Read a binder (overlay first), or start empty when none exists
    fn load_binder(&self, paths: &BinderPaths) -> Result<Container> {
        let Some(existing) = paths.existing() else {
            debug!("No binder at {:?}, starting empty", paths.header);
            return Ok(Container::new());
        };
        if self.config.create_backups {
            back_up(&existing)?;
        }
        self.codec.read_container(&existing.header, &existing.data)
    }

    fn transfer_loose(
        &self,
        used: &UsedAssetSet,
        pool: &mut ContainerPool,
        lightmaps: &mut Container,
    ) -> Result<usize> {
        let Some(dir) = &self.config.loose_texture_dir else {
            return Ok(0);
        };

        let planner = TransferPlanner::new();
        let mut transferred = 0;
        for path in layout::loose_textures(dir) {
            let Some(stem) = path.file_name().and_then(|n| n.to_str()).map(stem_of) else {
                continue;
            };
            if !used.contains(stem) {
                continue;
            }

            let entry = package::pack_file(&path, &self.config.compression)?;
            let placement = if package::is_lightmap(stem) {
                planner.place_single(entry, lightmaps)
            } else {
                planner.upsert(entry, pool)
            };
            if placement.is_placed() {
                debug!("Loose texture {} -> {:?}", stem, placement);
                transferred += 1;
            }
        }
        Ok(transferred)
    }

    /// Copy used base-layer entries that are not already present
    fn transfer_base(
        &self,
        base: &AssetLayer,
        used: &UsedAssetSet,
        pool: &mut ContainerPool,
        lightmaps: &mut Container,
    ) -> Result<(usize, u64)> {
        let level = self.config.level;
        let allocator = ContainerAllocator::new();
        let planner = TransferPlanner::new();
        let mut transferred = 0;
        let mut unused = 0;

        if self.config.copies_base_textures() {
            for i in 0..self.config.peer_count {
                let paths = base.peer_binder(level, i);
                if !paths.exists() {
                    continue;
                }
                let source = self.codec.read_container(&paths.header, &paths.data)?;
                unused += allocator.unused_bytes(&source, used);
                for entry in source.into_entries() {
                    if used.keeps_entry(&entry.name) && planner.place(entry, pool).is_placed() {
                        transferred += 1;
                    }
                }
            }
        }

        if self.config.copies_base_lightmaps() {
            let paths = base.lightmap_binder(level);
            if paths.exists() {
                let source = self.codec.read_container(&paths.header, &paths.data)?;
                unused += allocator.unused_bytes(&source, used);
                for entry in source.into_entries() {
                    if !used.keeps_entry(&entry.name)
                        || lightmaps.position_of_stem(entry.stem()).is_some()
                    {
                        continue;
                    }
                    if planner.place_single(entry, lightmaps) != Placement::AlreadyPresent {
                        transferred += 1;
                    }
                }
            }
        }

        Ok((transferred, unused))
    }

    fn write_all(
        &self,
        layer: &AssetLayer,
        pool: &ContainerPool,
        lightmaps: &Container,
    ) -> Result<usize> {
        let level = self.config.level;
        fs::create_dir_all(layer.texture_dir(level))?;

        let mut written = 0;
        for (i, container) in pool.containers().iter().enumerate() {
            let target = layer.peer_binder(level, i).target(self.config.use_patch);
            if self.write_binder(container, &target)? {
                written += 1;
            }
        }
        let target = layer.lightmap_binder(level).target(self.config.use_patch_env);
        if self.write_binder(lightmaps, &target)? {
            written += 1;
        }
        Ok(written)
    }

    /// Write a binder; an empty one is only written to truncate a stale file
    fn write_binder(&self, container: &Container, target: &BinderPaths) -> Result<bool> {
        if container.is_empty() && !target.exists() {
            return Ok(false);
        }
        self.codec
            .write_container(container, &target.header, &target.data)?;
        Ok(true)
    }
}

/// Copy a binder pair to `.bak` files, unless a backup already exists
fn back_up(paths: &BinderPaths) -> Result<()> {
    let backup = paths.backup();
    if backup.header.exists() || backup.data.exists() {
        return Ok(());
    }
    fs::copy(&paths.header, &backup.header)?;
    fs::copy(&paths.data, &backup.data)?;
    debug!("Backed up {:?}", paths.header);
    Ok(())
}
