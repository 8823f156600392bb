//! Texture usage resolution across the customized and base layers
//!
//! Resolution order:
//!
//! 1. Map pieces and objects placed by the customized layer's level description.
//! 2. If the customized layer placed no map pieces, the base layer's map pieces.
//! 3. Each map piece's bundle, taken from the customized layer when it ships
//!    one and from the base layer otherwise.
//! 4. Objects come from the customized description, or from the base
//!    description when the customized layer placed none. Either way, objects
//!    with a file in the customized `obj/` directory are read from there and
//!    dropped from the base-layer scan.
//! 5. Every external texture reference adds the texture and its low-detail pair.
//!
//! Missing layers, directories and files contribute nothing. Codec failures
//! on files that do exist abort resolution.

use crate::codec::{LevelLayout, LevelReader, ModelBundle, ModelReader};
use crate::config::LevelId;
use crate::core::names::texture_stem;
use crate::core::usage::{ModelKind, ModelReference, UsedAssetSet};
use crate::error::{MapBinderError, Result};
use crate::layout::AssetLayer;
use ahash::AHashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Computes the usage closure of a level
pub struct UsageResolver<'a, C> {
    codec: &'a C,
    threads: usize,
}

impl<'a, C> UsageResolver<'a, C>
where
    C: LevelReader + ModelReader + Sync,
{
    pub fn new(codec: &'a C) -> Self {
        UsageResolver { codec, threads: 1 }
    }

    /// Scan model bundles on `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Resolve the textures a level section needs
    pub fn resolve(
        &self,
        customized: &AssetLayer,
        base: Option<&AssetLayer>,
        level: LevelId,
    ) -> Result<UsedAssetSet> {
        let custom_models = self.placed_models(customized, level)?;
        let mut map_pieces = names_of(&custom_models, ModelKind::MapPiece);
        let mut objects = names_of(&custom_models, ModelKind::Object);

        let base_models = match base {
            Some(layer) if map_pieces.is_empty() || objects.is_empty() => {
                self.placed_models(layer, level)?
            }
            _ => AHashSet::new(),
        };
        if map_pieces.is_empty() {
            map_pieces = names_of(&base_models, ModelKind::MapPiece);
            debug!("Using {} map pieces from the base layer", map_pieces.len());
        }

        let mut bundles = Vec::new();

        // Map pieces: customized bundle wins over the base bundle of the same model
        let mut provided = AHashSet::new();
        for (model, path) in customized.map_piece_bundles(level) {
            if map_pieces.contains(&model) {
                provided.insert(model);
                bundles.push(path);
            }
        }
        if let Some(layer) = base {
            bundles.extend(
                layer
                    .map_piece_bundles(level)
                    .into_iter()
                    .filter(|(model, _)| map_pieces.contains(model) && !provided.contains(model))
                    .map(|(_, path)| path),
            );
        }

        // Objects: those with a file in the customized obj/ dir come from there only
        if objects.is_empty() {
            objects = names_of(&base_models, ModelKind::Object);
        }
        let local: AHashSet<String> = customized
            .object_ids()
            .into_iter()
            .filter(|id| objects.contains(id))
            .collect();
        bundles.extend(
            customized
                .object_bundles()
                .into_iter()
                .filter(|(model, _)| local.contains(model))
                .map(|(_, path)| path),
        );
        objects.retain(|id| !local.contains(id));
        if let Some(layer) = base {
            bundles.extend(
                layer
                    .object_bundles()
                    .into_iter()
                    .filter(|(model, _)| objects.contains(model))
                    .map(|(_, path)| path),
            );
        }

        let used = self.extract_all(&bundles)?;
        info!(
            "Resolved {} textures for level {} from {} bundles",
            used.texture_count(),
            level,
            bundles.len()
        );
        Ok(used)
    }

    /// Models placed by a layer's level description; empty if it has none
    pub fn placed_models(
        &self,
        layer: &AssetLayer,
        level: LevelId,
    ) -> Result<AHashSet<ModelReference>> {
        let Some(path) = layer.level_file(level) else {
            debug!("No level description for {} under {:?}", level, layer.root());
            return Ok(AHashSet::new());
        };
        let layout = self.codec.read_level(&path)?;
        Ok(model_references(&layout))
    }

    fn extract_all(&self, bundles: &[PathBuf]) -> Result<UsedAssetSet> {
        if self.threads <= 1 || bundles.len() < 2 {
            return self.extract_sequential(bundles);
        }

        let chunk_size = bundles.len().div_ceil(self.threads);
        let partials = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = bundles
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move |_| self.extract_sequential(chunk)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(MapBinderError::Worker("bundle scan panicked".into())))
                })
                .collect::<Vec<_>>()
        })
        .map_err(|_| MapBinderError::Worker("bundle scan scope panicked".into()))?;

        let mut used = UsedAssetSet::new();
        for partial in partials {
            used.union_with(partial?);
        }
        Ok(used)
    }

    fn extract_sequential(&self, bundles: &[PathBuf]) -> Result<UsedAssetSet> {
        let mut used = UsedAssetSet::new();
        for path in bundles {
            let bundle = self.codec.read_model(path)?;
            add_external_textures(&bundle, &mut used);
        }
        Ok(used)
    }
}

/// Add every texture a bundle references but does not ship itself
pub fn add_external_textures(bundle: &ModelBundle, used: &mut UsedAssetSet) {
    let embedded: AHashSet<&str> = bundle
        .embedded_textures
        .iter()
        .map(|name| texture_stem(name))
        .collect();

    for material in &bundle.materials {
        for path in material.texture_paths.iter().filter(|p| !p.is_empty()) {
            let stem = texture_stem(path);
            if !stem.is_empty() && !embedded.contains(stem) {
                used.insert_texture(stem);
            }
        }
    }
}

fn model_references(layout: &LevelLayout) -> AHashSet<ModelReference> {
    let pieces = layout
        .map_pieces
        .iter()
        .map(|p| ModelReference::map_piece(p.model_name.clone()));
    let objects = layout
        .objects
        .iter()
        .map(|o| ModelReference::object(o.model_name.clone()));
    pieces.chain(objects).collect()
}

fn names_of(models: &AHashSet<ModelReference>, kind: ModelKind) -> AHashSet<String> {
    models
        .iter()
        .filter(|m| m.kind == kind)
        .map(|m| m.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Material;

    #[test]
    fn test_embedded_textures_short_circuit() {
        let bundle = ModelBundle {
            materials: vec![
                Material {
                    name: "wall".into(),
                    texture_paths: vec![
                        r"N:\tex\m30_wall.tga".into(),
                        r"N:\tex\m30_wall_n.tga".into(),
                        String::new(),
                    ],
                },
                Material {
                    name: "decal".into(),
                    texture_paths: vec!["tex/local_decal.tga".into()],
                },
            ],
            embedded_textures: vec!["local_decal".into()],
        };
        let mut used = UsedAssetSet::new();
        add_external_textures(&bundle, &mut used);

        assert!(used.contains("m30_wall"));
        assert!(used.contains("m30_wall_l"));
        assert!(used.contains("m30_wall_n_l"));
        assert!(!used.contains("local_decal"));
        assert_eq!(used.len(), 4);
    }

    #[test]
    fn test_model_references_dedupe() {
        let layout = LevelLayout {
            map_pieces: vec![
                crate::codec::PlacedModel::new("m000100"),
                crate::codec::PlacedModel::new("m000100"),
            ],
            objects: vec![crate::codec::PlacedModel::new("o000100")],
        };
        let refs = model_references(&layout);

        assert_eq!(refs.len(), 2);
        assert_eq!(names_of(&refs, ModelKind::MapPiece).len(), 1);
        assert!(names_of(&refs, ModelKind::Object).contains("o000100"));
    }
}
