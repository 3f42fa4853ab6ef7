use constants::model_hierarchy::{GROUP_BOTTOM, GROUP_TOP, SKULL_IDENTIFIERS};
use serde::Serialize;

/// Semantic category of a mesh node in the dental model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshCategory {
    Skull,
    Tooth,
}

/// Dental arch a tooth belongs to. Drives which way the info tag is lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Upper,
    Lower,
}

/// Classify a mesh name. Anything that is not one of the skull parts is a tooth.
pub fn classify(mesh_id: &str) -> MeshCategory {
    if SKULL_IDENTIFIERS.iter().any(|skull| mesh_id.contains(skull)) {
        MeshCategory::Skull
    } else {
        MeshCategory::Tooth
    }
}

/// Canonicalise an exported mesh name into a registry key.
///
/// Strips whitespace, parentheses, a case-insensitive `tooth_` prefix and one
/// trailing `_<digits>` suffix: `"Tooth_Central Incisor(2)_14"` becomes
/// `"CentralIncisor2"`.
pub fn normalize(mesh_id: &str) -> String {
    let mut key: String = mesh_id
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();

    const PREFIX: &str = "tooth_";
    if key
        .get(..PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX))
    {
        key.drain(..PREFIX.len());
    }

    if let Some(split) = key.rfind('_') {
        let suffix = &key[split + 1..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            key.truncate(split);
        }
    }

    key
}

/// Arch from the asset's naming convention: `(1)` or no parenthesised index
/// marks the lower set, `(2)` and `(3)` the upper set.
pub fn arch_of(mesh_id: &str) -> Option<Arch> {
    if mesh_id.contains("(1)") || !mesh_id.contains('(') {
        Some(Arch::Lower)
    } else if mesh_id.contains("(2)") || mesh_id.contains("(3)") {
        Some(Arch::Upper)
    } else {
        None
    }
}

/// Arch from an ancestor group node name, when the asset keeps its grouping.
pub fn arch_of_group(group_name: &str) -> Option<Arch> {
    if group_name.contains(GROUP_TOP) {
        Some(Arch::Upper)
    } else if group_name.contains(GROUP_BOTTOM) {
        Some(Arch::Lower)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skull_parts_are_skull() {
        assert_eq!(classify("Skeletal_Cranium"), MeshCategory::Skull);
        assert_eq!(classify("Skeletal_Mandible"), MeshCategory::Skull);
        assert_eq!(classify("Skeletal_Cranium_1"), MeshCategory::Skull);
    }

    #[test]
    fn everything_else_is_a_tooth() {
        for name in ["CentralIncisor", "1stMolar_2", "", "Skeletal", "cranium"] {
            assert_eq!(classify(name), MeshCategory::Tooth, "{name}");
        }
    }

    #[test]
    fn classification_is_stable() {
        for name in ["Skeletal_Mandible", "Cuspid_3", "???"] {
            assert_eq!(classify(name), classify(name));
        }
    }

    #[test]
    fn normalize_strips_decorations() {
        assert_eq!(normalize("CentralIncisor_2"), "CentralIncisor");
        assert_eq!(normalize("Tooth_1stMolar_14"), "1stMolar");
        assert_eq!(normalize("tooth_Lateral Incisor"), "LateralIncisor");
        assert_eq!(normalize("2nd Bicuspid (3)"), "2ndBicuspid3");
        assert_eq!(normalize("Cuspid"), "Cuspid");
    }

    #[test]
    fn normalize_keeps_non_numeric_suffix() {
        assert_eq!(normalize("Molar_left"), "Molar_left");
        assert_eq!(normalize("Molar_"), "Molar_");
    }

    #[test]
    fn normalize_only_strips_a_leading_prefix() {
        assert_eq!(normalize("Upper_tooth_Canine"), "Upper_tooth_Canine");
    }

    #[test]
    fn arch_follows_parenthesised_index() {
        assert_eq!(arch_of("CentralIncisor"), Some(Arch::Lower));
        assert_eq!(arch_of("CentralIncisor(1)"), Some(Arch::Lower));
        assert_eq!(arch_of("CentralIncisor(2)"), Some(Arch::Upper));
        assert_eq!(arch_of("CentralIncisor(3)"), Some(Arch::Upper));
        assert_eq!(arch_of("CentralIncisor(7)"), None);
    }

    #[test]
    fn arch_from_group_names() {
        assert_eq!(arch_of_group("TopSetOfTeeth"), Some(Arch::Upper));
        assert_eq!(arch_of_group("BottomSetOfTeeth.001"), Some(Arch::Lower));
        assert_eq!(arch_of_group("Scene"), None);
    }
}
