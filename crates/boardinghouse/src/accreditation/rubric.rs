use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Points an item contributes to the maximum score, whatever its status.
pub const ITEM_WEIGHT: u32 = 2;

/// Single criterion within a rubric section, e.g. "Room Size".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricItem {
    pub key: String,
    pub label: String,
    /// A `not_acceptable` rating on a critical item blocks accreditation.
    #[serde(default)]
    pub critical: bool,
}

/// Named group of criteria rated together on the evaluation matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricSection {
    pub key: String,
    pub label: String,
    pub items: Vec<RubricItem>,
}

impl RubricSection {
    pub fn item(&self, key: &str) -> Option<&RubricItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn max_score(&self) -> u32 {
        self.items.len() as u32 * ITEM_WEIGHT
    }
}

/// Optional amenity checked off on the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmenityDefinition {
    pub key: String,
    pub label: String,
}

/// Fixed evaluation schema injected into the scorer and form guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricSchema {
    sections: Vec<RubricSection>,
    #[serde(default)]
    amenities: Vec<AmenityDefinition>,
}

impl RubricSchema {
    pub fn new(sections: Vec<RubricSection>, amenities: Vec<AmenityDefinition>) -> Self {
        Self {
            sections,
            amenities,
        }
    }

    /// The university's boarding-house accreditation rubric.
    pub fn standard() -> Self {
        Self::new(
            vec![
                section(
                    "facility",
                    "Facility",
                    &[
                        ("roomSize", "Room Size", false),
                        ("ventilation", "Ventilation", false),
                        ("buildingComponent", "Building Component", false),
                        ("hallway", "Hallway", false),
                        ("kitchen", "Kitchen", false),
                        ("diningArea", "Dining Area", false),
                        ("bathroomFacilities", "Bathroom Facilities", false),
                        ("comfortRoom", "Comfort Room", false),
                        ("visitorsArea", "Visitor's Area", false),
                    ],
                ),
                section(
                    "safety",
                    "Safety",
                    &[
                        ("fireSafety", "Fire safety", true),
                        ("electricalInstallation", "Electrical Installation", true),
                        ("firstAidKit", "First Aid Kit", false),
                        ("sanitation", "Sanitation", true),
                    ],
                ),
                section(
                    "security",
                    "Security",
                    &[
                        (
                            "locksDoorsWindows",
                            "Functional locks on doors and windows",
                            true,
                        ),
                        (
                            "adequateLighting",
                            "Adequate lighting in common areas and outdoor spaces",
                            false,
                        ),
                        ("securityPresence", "Presence of any security issue", false),
                    ],
                ),
                section(
                    "rate",
                    "Rate",
                    &[
                        ("roomRate", "Room rate", false),
                        ("additionalCharges", "Additional charges", false),
                    ],
                ),
            ],
            vec![
                amenity("surveillanceCamera", "Surveillance camera"),
                amenity("wifi", "Wifi"),
                amenity("airConditioning", "Airconditioning unit"),
                amenity("potableWater", "Potable water dispenser"),
            ],
        )
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RubricError> {
        let schema: Self = serde_json::from_reader(reader)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_path(path: &Path) -> Result<Self, RubricError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn validate(&self) -> Result<(), RubricError> {
        if self.sections.is_empty() {
            return Err(RubricError::Empty);
        }
        for (index, section) in self.sections.iter().enumerate() {
            if self.sections[..index]
                .iter()
                .any(|earlier| earlier.key == section.key)
            {
                return Err(RubricError::DuplicateKey(section.key.clone()));
            }
            for (item_index, item) in section.items.iter().enumerate() {
                if section.items[..item_index]
                    .iter()
                    .any(|earlier| earlier.key == item.key)
                {
                    return Err(RubricError::DuplicateKey(format!(
                        "{}.{}",
                        section.key, item.key
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn sections(&self) -> &[RubricSection] {
        &self.sections
    }

    pub fn section(&self, key: &str) -> Option<&RubricSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    pub fn item(&self, section: &str, item: &str) -> Option<&RubricItem> {
        self.section(section).and_then(|section| section.item(item))
    }

    pub fn amenities(&self) -> &[AmenityDefinition] {
        &self.amenities
    }

    pub fn has_amenity(&self, key: &str) -> bool {
        self.amenities.iter().any(|amenity| amenity.key == key)
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|section| section.items.len()).sum()
    }

    pub fn max_score(&self) -> u32 {
        self.sections.iter().map(RubricSection::max_score).sum()
    }

    /// `(section, item)` pairs whose failure blocks accreditation.
    pub fn critical_items(&self) -> impl Iterator<Item = (&RubricSection, &RubricItem)> {
        self.sections.iter().flat_map(|section| {
            section
                .items
                .iter()
                .filter(|item| item.critical)
                .map(move |item| (section, item))
        })
    }
}

impl Default for RubricSchema {
    fn default() -> Self {
        Self::standard()
    }
}

fn section(key: &str, label: &str, items: &[(&str, &str, bool)]) -> RubricSection {
    RubricSection {
        key: key.to_string(),
        label: label.to_string(),
        items: items
            .iter()
            .map(|(key, label, critical)| RubricItem {
                key: key.to_string(),
                label: label.to_string(),
                critical: *critical,
            })
            .collect(),
    }
}

fn amenity(key: &str, label: &str) -> AmenityDefinition {
    AmenityDefinition {
        key: key.to_string(),
        label: label.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RubricError {
    #[error("unable to read rubric: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed rubric: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rubric defines no sections")]
    Empty,
    #[error("rubric key '{0}' is defined more than once")]
    DuplicateKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rubric_has_eighteen_items() {
        let rubric = RubricSchema::standard();
        let counts: Vec<_> = rubric
            .sections()
            .iter()
            .map(|section| (section.key.as_str(), section.items.len()))
            .collect();

        assert_eq!(
            counts,
            vec![("facility", 9), ("safety", 4), ("security", 3), ("rate", 2)]
        );
        assert_eq!(rubric.item_count(), 18);
        assert_eq!(rubric.max_score(), 36);
        assert_eq!(rubric.amenities().len(), 4);
    }

    #[test]
    fn critical_items_cover_fire_electrical_sanitation_and_locks() {
        let rubric = RubricSchema::standard();
        let critical: Vec<_> = rubric
            .critical_items()
            .map(|(_, item)| item.key.as_str())
            .collect();

        assert_eq!(
            critical,
            vec![
                "fireSafety",
                "electricalInstallation",
                "sanitation",
                "locksDoorsWindows"
            ]
        );
    }

    #[test]
    fn loads_custom_rubric_from_json() {
        let json = r#"{
            "sections": [
                {"key": "safety", "label": "Safety", "items": [
                    {"key": "fireSafety", "label": "Fire safety", "critical": true},
                    {"key": "firstAidKit", "label": "First Aid Kit"}
                ]}
            ]
        }"#;

        let rubric = RubricSchema::from_reader(json.as_bytes()).expect("rubric parses");

        assert_eq!(rubric.item_count(), 2);
        assert!(rubric.amenities().is_empty());
        assert!(rubric.item("safety", "fireSafety").expect("item").critical);
        assert!(!rubric.item("safety", "firstAidKit").expect("item").critical);
    }

    #[test]
    fn rejects_duplicate_item_keys() {
        let json = r#"{
            "sections": [
                {"key": "rate", "label": "Rate", "items": [
                    {"key": "roomRate", "label": "Room rate"},
                    {"key": "roomRate", "label": "Room rate again"}
                ]}
            ]
        }"#;

        match RubricSchema::from_reader(json.as_bytes()) {
            Err(RubricError::DuplicateKey(key)) => assert_eq!(key, "rate.roomRate"),
            other => panic!("expected duplicate key error, got {other:?}"),
        }
    }
}
