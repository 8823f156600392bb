//! Texture naming rules
//!
//! Entries inside a binder are named `{stem}.tpf.dcx`. A stem ending in
//! [`LOW_DETAIL_SUFFIX`] is the low-detail variant of the stem without it.
//!
//! - **stem**: entry name with every extension stripped (keeps `_l`)
//! - **base identifier**: stem with the low-detail suffix stripped

/// Suffix marking the low-detail variant of a texture
pub const LOW_DETAIL_SUFFIX: &str = "_l";

/// Extension given to packaged texture entries
pub const ENTRY_EXTENSION: &str = ".tpf.dcx";

/// Strip every extension from an entry name (`a_l.tpf.dcx` -> `a_l`)
pub fn stem_of(entry_name: &str) -> &str {
    let file = last_component(entry_name);
    match file.find('.') {
        Some(idx) => &file[..idx],
        None => file,
    }
}

/// Base identifier of an entry name (`a_l.tpf.dcx` -> `a`)
pub fn base_identifier(entry_name: &str) -> &str {
    let stem = stem_of(entry_name);
    stem.strip_suffix(LOW_DETAIL_SUFFIX).unwrap_or(stem)
}

/// Check whether a stem or entry name is a low-detail variant
pub fn is_low_detail(name: &str) -> bool {
    stem_of(name).ends_with(LOW_DETAIL_SUFFIX)
}

/// Low-detail stem paired with a base identifier
pub fn low_detail_of(base: &str) -> String {
    format!("{}{}", base, LOW_DETAIL_SUFFIX)
}

/// Detail stem paired with a low-detail stem (`a_l` -> `a`)
pub fn detail_of(low: &str) -> &str {
    low.strip_suffix(LOW_DETAIL_SUFFIX).unwrap_or(low)
}

/// Entry name for a stem (`a` -> `a.tpf.dcx`)
pub fn entry_name_for(stem: &str) -> String {
    format!("{}{}", stem, ENTRY_EXTENSION)
}

/// Stem of a material texture path as written by the modelling tools
///
/// Paths use either separator (`N:\FDP\data\tex\wall.tga`), so the last
/// component is found by hand rather than through `std::path`. Only the final
/// extension is stripped.
pub fn texture_stem(path: &str) -> &str {
    let file = last_component(path);
    match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    }
}

fn last_component(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_and_base() {
        assert_eq!(stem_of("m30_wall.tpf.dcx"), "m30_wall");
        assert_eq!(stem_of("m30_wall_l.tpf.dcx"), "m30_wall_l");
        assert_eq!(base_identifier("m30_wall_l.tpf.dcx"), "m30_wall");
        assert_eq!(base_identifier("m30_wall.tpf.dcx"), "m30_wall");
        assert_eq!(base_identifier("plain"), "plain");
    }

    #[test]
    fn test_low_detail_detection() {
        assert!(is_low_detail("rock_l.tpf.dcx"));
        assert!(is_low_detail("rock_n_l"));
        assert!(!is_low_detail("rock_n.tpf.dcx"));
        assert!(!is_low_detail("lamp.tpf.dcx"));
    }

    #[test]
    fn test_texture_stem_handles_both_separators() {
        assert_eq!(texture_stem(r"N:\FDP\data\Model\map\tex\m30_wall.tga"), "m30_wall");
        assert_eq!(texture_stem("tex/m30_floor.dds"), "m30_floor");
        assert_eq!(texture_stem("m30_floor"), "m30_floor");
    }

    #[test]
    fn test_pair_names() {
        assert_eq!(low_detail_of("a"), "a_l");
        assert_eq!(detail_of("a_l"), "a");
        assert_eq!(detail_of("a"), "a");
        assert_eq!(entry_name_for("a_l"), "a_l.tpf.dcx");
    }
}
