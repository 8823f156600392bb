//! MapBinder CLI
//!
//! Repacks the texture binders of one level section

use anyhow::{bail, Context};
use clap::Parser;
use mapbinder::codec::compression::CompressionConfig;
use mapbinder::{BalanceConfig, LevelId, RepackConfig, Repacker};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mapbinder")]
#[command(about = "Prune, level and refill the texture binders of a level")]
struct Args {
    /// TOML configuration file; flags below override its values
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Level section, e.g. 30_0
    #[arg(short = 'l', long)]
    level: Option<LevelId>,

    /// Root of the customized layer
    #[arg(short = 'm', long)]
    mod_root: Option<PathBuf>,

    /// Root of the base game layer
    #[arg(short = 'g', long)]
    game_root: Option<PathBuf>,

    /// Directory of loose .dds textures to package
    #[arg(short = 't', long)]
    textures: Option<PathBuf>,

    /// Write peer binders as .patch overlays
    #[arg(long)]
    patch: bool,

    /// Write the lightmap binder as a .patch overlay
    #[arg(long)]
    patch_env: bool,

    /// Do not copy textures out of the base layer's peer binders
    #[arg(long)]
    skip_base_textures: bool,

    /// Do not copy lightmaps out of the base layer's lightmap binder
    #[arg(long)]
    skip_base_lightmaps: bool,

    /// Keep .bak copies of binders before rewriting them
    #[arg(long)]
    backups: bool,

    /// Byte difference below which two binders count as level
    #[arg(long)]
    tolerance: Option<u64>,

    /// Worker threads for model bundle scanning
    #[arg(long)]
    threads: Option<usize>,

    /// Payload compression for packaged textures (none, lz4, zstd)
    #[arg(long)]
    compression: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<RepackConfig> {
        let mut config = match (&self.config, self.level, &self.mod_root) {
            (Some(path), _, _) => RepackConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {:?}", path))?,
            (None, Some(level), Some(mod_root)) => RepackConfig::new(level, mod_root),
            _ => bail!("either --config or both --level and --mod-root are required"),
        };

        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(mod_root) = self.mod_root {
            config.mod_root = mod_root;
        }
        if let Some(game_root) = self.game_root {
            config.game_root = Some(game_root);
        }
        if let Some(textures) = self.textures {
            config.loose_texture_dir = Some(textures);
        }
        if let Some(tolerance) = self.tolerance {
            config.balance = BalanceConfig {
                tolerance,
                ..config.balance
            };
        }
        if let Some(threads) = self.threads {
            config.resolve_threads = threads;
        }
        if let Some(compression) = &self.compression {
            config.compression = parse_compression(compression).map_err(anyhow::Error::msg)?;
        }
        config.use_patch |= self.patch;
        config.use_patch_env |= self.patch_env;
        config.include_base_textures &= !self.skip_base_textures;
        config.include_base_lightmaps &= !self.skip_base_lightmaps;
        config.create_backups |= self.backups;

        config.validate()?;
        Ok(config)
    }
}

/// Parse a compression method from CLI string
fn parse_compression(s: &str) -> Result<CompressionConfig, String> {
    match s.to_lowercase().as_str() {
        "none" => Ok(CompressionConfig::none()),
        "lz4" => Ok(CompressionConfig::lz4()),
        "zstd" => Ok(CompressionConfig::zstd()),
        _ => Err(format!(
            "Invalid compression '{}'. Valid options: none, lz4, zstd",
            s
        )),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let json = args.json;
    let config = args.into_config()?;

    info!("Repacking level {} in {:?}", config.level, config.mod_root);
    if let Some(game_root) = &config.game_root {
        info!("Base layer: {:?}", game_root);
    }

    let report = Repacker::new(config).run()?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        info!(
            "Done: {} textures used, {} KB reclaimed, {} balance moves, {} loose and {} base textures added, {} binders written",
            report.used_textures,
            report.bytes_reclaimed / 1000,
            report.balance_moves,
            report.loose_transferred,
            report.base_transferred,
            report.binders_written
        );
    }
    Ok(())
}
