/// Relative asset path of the compressed dental model.
pub const MODEL_PATH: &str = "models/SkullWithTeeth-processed.glb";

/// Mesh names that belong to the skull rather than the dentition.
pub const SKULL_CRANIUM: &str = "Skeletal_Cranium";
pub const SKULL_MANDIBLE: &str = "Skeletal_Mandible";
pub const SKULL_IDENTIFIERS: &[&str] = &[SKULL_CRANIUM, SKULL_MANDIBLE];

/// Group nodes the asset uses to split the two arches.
pub const GROUP_TOP: &str = "TopSetOfTeeth";
pub const GROUP_BOTTOM: &str = "BottomSetOfTeeth";

/// Mesh names exported for the lower arch. Duplicate base names are
/// disambiguated by numeric suffixes, and the asset spells the canine
/// "Cupsid" in this arch.
pub const BOTTOM_TEETH: &[&str] = &[
    "3rdMolar",
    "2ndMolar",
    "1stMolar",
    "2ndBicuspid",
    "1stBicuspid",
    "Cupsid",
    "LateralIncisor",
    "CentralIncisor",
    "3rdMolar_1",
    "2ndMolar_1",
    "1stMolar_1",
    "2ndBicuspid_1",
    "1stBicuspid_1",
    "Cupsid_1",
    "LateralIncisor_1",
    "CentralIncisor_1",
];

/// Mesh names exported for the upper arch.
pub const TOP_TEETH: &[&str] = &[
    "1stBicuspid_2",
    "1stMolar_2",
    "2ndBicuspid_2",
    "2ndMolar_2",
    "3rdMolar_2",
    "CentralIncisor_2",
    "Cuspid",
    "LateralIncisor_2",
    "1stBicuspid_3",
    "1stMolar_3",
    "2ndBicuspid_3",
    "2ndMolar_3",
    "3rdMolar_3",
    "CentralIncisor_3",
    "Cuspid_1",
    "LateralIncisor_3",
];
