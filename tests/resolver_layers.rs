//! Usage resolution across customized and base layers

use mapbinder::codec::document::{write_level, write_model};
use mapbinder::{
    AssetLayer, LevelId, LevelLayout, Material, ModelBundle, NativeCodec, PlacedModel,
    UsageResolver,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LEVEL: LevelId = LevelId { map: 30, block: 0 };

fn level(root: &Path, pieces: &[&str], objects: &[&str]) {
    let studio = root.join("map/mapstudio");
    fs::create_dir_all(&studio).unwrap();
    write_level(
        &studio.join("m30_00_00_00.msb.dcx"),
        &LevelLayout {
            map_pieces: pieces.iter().map(|m| PlacedModel::new(*m)).collect(),
            objects: objects.iter().map(|o| PlacedModel::new(*o)).collect(),
        },
    )
    .unwrap();
}

fn model(path: &Path, textures: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_model(
        path,
        &ModelBundle {
            materials: vec![Material {
                name: "m".into(),
                texture_paths: textures.iter().map(|t| format!(r"N:\tex\{}.tga", t)).collect(),
            }],
            embedded_textures: Vec::new(),
        },
    )
    .unwrap();
}

fn piece(root: &Path, id: &str, textures: &[&str]) {
    model(
        &root.join(format!("map/m30_00_00_00/m30_00_00_00_{}.mapbnd.dcx", id)),
        textures,
    );
}

fn object(root: &Path, id: &str, textures: &[&str]) {
    model(&root.join(format!("obj/{}.objbnd.dcx", id)), textures);
}

fn sorted(used: &mapbinder::UsedAssetSet) -> Vec<String> {
    let mut stems: Vec<String> = used.iter().map(str::to_string).collect();
    stems.sort();
    stems
}

#[test]
fn test_customized_bundle_overrides_base_per_model() {
    let custom = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    level(custom.path(), &["m000100", "m000200"], &[]);
    piece(custom.path(), "000100", &["custom_tex"]);
    piece(base.path(), "000100", &["base_tex"]);
    piece(base.path(), "000200", &["base_other"]);
    piece(base.path(), "000300", &["not_placed"]);

    let codec = NativeCodec;
    let used = UsageResolver::new(&codec)
        .resolve(
            &AssetLayer::new(custom.path()),
            Some(&AssetLayer::new(base.path())),
            LEVEL,
        )
        .unwrap();

    assert_eq!(
        sorted(&used),
        vec!["base_other", "base_other_l", "custom_tex", "custom_tex_l"]
    );
}

#[test]
fn test_falls_back_to_base_description() {
    let custom = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    level(base.path(), &["m000100"], &["o000001"]);
    piece(base.path(), "000100", &["wall"]);
    object(base.path(), "o000001", &["barrel"]);

    let codec = NativeCodec;
    let used = UsageResolver::new(&codec)
        .resolve(
            &AssetLayer::new(custom.path()),
            Some(&AssetLayer::new(base.path())),
            LEVEL,
        )
        .unwrap();

    assert!(used.contains("wall"));
    assert!(used.contains("barrel_l"));
    assert_eq!(used.texture_count(), 2);
}

#[test]
fn test_local_objects_are_not_rescanned_from_base() {
    let custom = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    level(custom.path(), &["m000100"], &["o000001", "o000002"]);
    piece(custom.path(), "000100", &["wall"]);
    object(custom.path(), "o000001", &["crate_custom"]);
    object(base.path(), "o000001", &["crate_base"]);
    object(base.path(), "o000002", &["lamp"]);
    object(base.path(), "o000003", &["unplaced"]);

    let codec = NativeCodec;
    let used = UsageResolver::new(&codec)
        .resolve(
            &AssetLayer::new(custom.path()),
            Some(&AssetLayer::new(base.path())),
            LEVEL,
        )
        .unwrap();

    assert!(used.contains("crate_custom"));
    assert!(used.contains("lamp"));
    assert!(!used.contains("crate_base"));
    assert!(!used.contains("unplaced"));
}

#[test]
fn test_customized_object_overrides_base_without_description() {
    let custom = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    level(base.path(), &["m000100"], &["o000001"]);
    piece(custom.path(), "000100", &["wall_custom"]);
    piece(base.path(), "000100", &["wall_base"]);
    object(custom.path(), "o000001", &["crate_custom"]);
    object(base.path(), "o000001", &["crate_base"]);

    let codec = NativeCodec;
    let used = UsageResolver::new(&codec)
        .resolve(
            &AssetLayer::new(custom.path()),
            Some(&AssetLayer::new(base.path())),
            LEVEL,
        )
        .unwrap();

    assert_eq!(
        sorted(&used),
        vec!["crate_custom", "crate_custom_l", "wall_custom", "wall_custom_l"]
    );
}

#[test]
fn test_no_layers_means_nothing_used() {
    let custom = TempDir::new().unwrap();
    let codec = NativeCodec;
    let used = UsageResolver::new(&codec)
        .resolve(&AssetLayer::new(custom.path()), None, LEVEL)
        .unwrap();
    assert!(used.is_empty());
}

#[test]
fn test_parallel_scan_matches_sequential() {
    let custom = TempDir::new().unwrap();
    let ids: Vec<String> = (1..=12).map(|i| format!("m{:06}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    level(custom.path(), &id_refs, &[]);
    for (i, id) in ids.iter().enumerate() {
        let tex = format!("tex_{}", i % 5);
        piece(custom.path(), &id[1..], &[tex.as_str(), "shared"]);
    }

    let codec = NativeCodec;
    let layer = AssetLayer::new(custom.path());
    let sequential = UsageResolver::new(&codec).resolve(&layer, None, LEVEL).unwrap();
    let parallel = UsageResolver::new(&codec)
        .with_threads(4)
        .resolve(&layer, None, LEVEL)
        .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(parallel.texture_count(), 6);
}

#[test]
fn test_corrupt_level_description_is_an_error() {
    let custom = TempDir::new().unwrap();
    let studio = custom.path().join("map/MapStudio");
    fs::create_dir_all(&studio).unwrap();
    fs::write(studio.join("m30_00_00_00.msb.dcx"), b"definitely not a level").unwrap();

    let codec = NativeCodec;
    let result = UsageResolver::new(&codec).resolve(&AssetLayer::new(custom.path()), None, LEVEL);
    assert!(result.is_err());
}
