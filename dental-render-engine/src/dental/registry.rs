use std::collections::HashMap;
use std::sync::LazyLock;

use bevy::prelude::Color;
use serde::Serialize;

use super::classifier::normalize;

/// Clinical status shown on the info tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToothStatus {
    Healthy,
    Treated,
    NeedsTreatment,
    Monitoring,
}

impl ToothStatus {
    const ALL: [Self; 4] = [
        Self::Healthy,
        Self::Treated,
        Self::NeedsTreatment,
        Self::Monitoring,
    ];

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Treated => "treated",
            Self::NeedsTreatment => "needs treatment",
            Self::Monitoring => "monitoring",
        }
    }

    /// Indicator colour used by the tag panel.
    pub fn colour(&self) -> Color {
        match self {
            Self::Healthy => Color::srgb(0.290, 0.871, 0.502),
            Self::Treated => Color::srgb(0.376, 0.647, 0.980),
            Self::NeedsTreatment => Color::srgb(0.973, 0.443, 0.443),
            Self::Monitoring => Color::srgb(0.580, 0.639, 0.722),
        }
    }
}

/// Clinical metadata for one tooth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToothRecord {
    pub dental_number: String,
    pub display_name: String,
    pub status: ToothStatus,
    pub last_treatment: String,
    pub history: Vec<String>,
    pub notes: String,
}

impl ToothRecord {
    /// Placeholder returned for identifiers the chart does not know.
    fn unknown() -> Self {
        Self {
            dental_number: UNKNOWN_NUMBER.to_string(),
            display_name: "Unknown Tooth".to_string(),
            status: ToothStatus::Monitoring,
            last_treatment: "No treatment record".to_string(),
            history: Vec::new(),
            notes: "No notes available".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.dental_number == UNKNOWN_NUMBER
    }
}

const UNKNOWN_NUMBER: &str = "00";

/// Asset mesh base name, FDI number, display name. Quadrant is encoded by the
/// numeric suffix: none = lower right, `_1` = lower left, `_2` = upper right,
/// `_3` = upper left. The lower arch keeps the asset's "Cupsid" spelling.
const CHART: &[(&str, &str, &str)] = &[
    ("CentralIncisor", "41", "Lower Right Central Incisor"),
    ("LateralIncisor", "42", "Lower Right Lateral Incisor"),
    ("Cupsid", "43", "Lower Right Canine"),
    ("1stBicuspid", "44", "Lower Right First Premolar"),
    ("2ndBicuspid", "45", "Lower Right Second Premolar"),
    ("1stMolar", "46", "Lower Right First Molar"),
    ("2ndMolar", "47", "Lower Right Second Molar"),
    ("3rdMolar", "48", "Lower Right Third Molar"),
    ("CentralIncisor_1", "31", "Lower Left Central Incisor"),
    ("LateralIncisor_1", "32", "Lower Left Lateral Incisor"),
    ("Cupsid_1", "33", "Lower Left Canine"),
    ("1stBicuspid_1", "34", "Lower Left First Premolar"),
    ("2ndBicuspid_1", "35", "Lower Left Second Premolar"),
    ("1stMolar_1", "36", "Lower Left First Molar"),
    ("2ndMolar_1", "37", "Lower Left Second Molar"),
    ("3rdMolar_1", "38", "Lower Left Third Molar"),
    ("CentralIncisor_2", "11", "Upper Right Central Incisor"),
    ("LateralIncisor_2", "12", "Upper Right Lateral Incisor"),
    ("Cuspid_2", "13", "Upper Right Canine"),
    ("1stBicuspid_2", "14", "Upper Right First Premolar"),
    ("2ndBicuspid_2", "15", "Upper Right Second Premolar"),
    ("1stMolar_2", "16", "Upper Right First Molar"),
    ("2ndMolar_2", "17", "Upper Right Second Molar"),
    ("3rdMolar_2", "18", "Upper Right Third Molar"),
    ("CentralIncisor_3", "21", "Upper Left Central Incisor"),
    ("LateralIncisor_3", "22", "Upper Left Lateral Incisor"),
    ("Cuspid_3", "23", "Upper Left Canine"),
    ("1stBicuspid_3", "24", "Upper Left First Premolar"),
    ("2ndBicuspid_3", "25", "Upper Left Second Premolar"),
    ("1stMolar_3", "26", "Upper Left First Molar"),
    ("2ndMolar_3", "27", "Upper Left Second Molar"),
    ("3rdMolar_3", "28", "Upper Left Third Molar"),
];

const TREATMENTS: [&str; 6] = [
    "Regular Cleaning",
    "Deep Cleaning",
    "Cavity Filling",
    "Root Canal",
    "Crown Placement",
    "X-Ray Examination",
];

const MONTHS: [&str; 6] = ["January", "February", "March", "April", "May", "June"];

const NOTES: [&str; 5] = [
    "Excellent condition, regular maintenance recommended",
    "Minor sensitivity to cold, monitoring required",
    "Recent treatment healing well, follow-up scheduled",
    "Regular checkups maintaining good oral health",
    "Preventive measures showing positive results",
];

static REGISTRY: LazyLock<HashMap<&'static str, ToothRecord>> = LazyLock::new(|| {
    CHART
        .iter()
        .map(|(key, number, name)| (*key, chart_record(number, name)))
        .collect()
});

static UNKNOWN: LazyLock<ToothRecord> = LazyLock::new(ToothRecord::unknown);

/// Build a chart entry. History and status are derived from the FDI number
/// so every session shows the same chart.
fn chart_record(number: &str, name: &str) -> ToothRecord {
    let seed: usize = number.parse().unwrap_or(0);

    let history = (0..3)
        .map(|i| {
            format!(
                "{} - {} 2024",
                TREATMENTS[(seed + i * 5) % TREATMENTS.len()],
                MONTHS[(seed + i * 2) % MONTHS.len()]
            )
        })
        .collect();

    ToothRecord {
        dental_number: number.to_string(),
        display_name: name.to_string(),
        status: ToothStatus::ALL[(seed * 7 + seed / 10) % ToothStatus::ALL.len()],
        last_treatment: format!(
            "{} ({} months ago)",
            TREATMENTS[seed % TREATMENTS.len()],
            seed % 6 + 1
        ),
        history,
        notes: NOTES[seed % NOTES.len()].to_string(),
    }
}

/// Resolve a mesh name to its clinical record.
///
/// Tries the normalised key, then the key with all digits removed, then the
/// quadrant suffix variants `_1`, `_2`, `_3`. Falls back to the
/// "Unknown Tooth" record.
pub fn lookup(mesh_id: &str) -> &'static ToothRecord {
    let key = normalize(mesh_id);

    if let Some(record) = REGISTRY.get(key.as_str()) {
        return record;
    }

    let without_digits: String = key.chars().filter(|c| !c.is_ascii_digit()).collect();
    if let Some(record) = REGISTRY.get(without_digits.as_str()) {
        return record;
    }

    ["_1", "_2", "_3"]
        .iter()
        .find_map(|suffix| REGISTRY.get(format!("{key}{suffix}").as_str()))
        .unwrap_or_else(|| &*UNKNOWN)
}

/// Number of charted teeth.
#[cfg(test)]
fn chart_len() -> usize {
    REGISTRY.len()
}
