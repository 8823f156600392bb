//! # MapBinder - Level Texture Usage Resolution and Binder Repacking
//!
//! `mapbinder` rebuilds the texture binders of one level section so they hold
//! exactly the textures the level uses:
//!
//! - **Usage resolution** across a customized layer and the base game layer
//! - **Pruning** of entries nothing references
//! - **Leveling** of byte sizes across the peer binders
//! - **Adjacent placement** keeping every texture next to its `_l` variant
//! - **Packaging** of loose `.dds` textures, with LZ4/Zstd payload compression
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapbinder::{LevelId, RepackConfig, Repacker, Result};
//!
//! # fn main() -> Result<()> {
//! let config = RepackConfig::new(LevelId::new(30, 0), "/mods/my-mod")
//!     .with_game_root("/game/Data")
//!     .with_loose_textures("/mods/my-mod/dds");
//!
//! let report = Repacker::new(config).run()?;
//! println!("{} textures in use", report.used_textures);
//! # Ok(())
//! # }
//! ```
//!
//! ## Working on containers directly
//!
//! ```rust
//! use mapbinder::{ContainerPool, Entry, TransferPlanner};
//!
//! let mut pool = ContainerPool::new(4);
//! let planner = TransferPlanner::new();
//! planner.place(Entry::new("m30_wall.tpf.dcx", vec![0; 64], 0), &mut pool);
//! planner.place(Entry::new("m30_wall_l.tpf.dcx", vec![0; 16], 0), &mut pool);
//!
//! // The low-detail entry lands right after its detail entry
//! assert_eq!(pool.containers()[0].len(), 2);
//! ```

pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod layout;
pub mod pipeline;

pub use crate::codec::{
    ContainerCodec, LevelLayout, LevelReader, Material, ModelBundle, ModelReader, NativeCodec,
    PlacedModel,
};
pub use crate::config::{LevelId, RepackConfig};
pub use crate::core::{
    allocator::ContainerAllocator,
    balance::{BalanceConfig, BalanceScheduler},
    container::{Container, Entry},
    planner::{Placement, TransferPlanner},
    pool::ContainerPool,
    resolver::UsageResolver,
    usage::{ModelKind, ModelReference, UsedAssetSet},
};
pub use crate::error::{MapBinderError, Result};
pub use crate::layout::{AssetLayer, BinderPaths};
pub use crate::pipeline::{RepackReport, Repacker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
