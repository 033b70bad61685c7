use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::evaluation::AccreditationStatus;
use super::rubric::{RubricSchema, ITEM_WEIGHT};

/// Identifier wrapper for stored accreditation records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccreditationId(pub String);

/// Rating applied to a single rubric item.
///
/// Deserialization is lenient: the empty string the form posts for an
/// untouched row, `null`, non-string values and anything we do not
/// recognise all become `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    #[default]
    Unset,
    Acceptable,
    Considerable,
    NotAcceptable,
}

impl EvaluationStatus {
    pub const fn points(self) -> u32 {
        match self {
            EvaluationStatus::Acceptable => ITEM_WEIGHT,
            EvaluationStatus::Considerable => ITEM_WEIGHT / 2,
            EvaluationStatus::NotAcceptable | EvaluationStatus::Unset => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStatus::Unset => "Not rated",
            EvaluationStatus::Acceptable => "Acceptable",
            EvaluationStatus::Considerable => "Considerable",
            EvaluationStatus::NotAcceptable => "Not acceptable",
        }
    }
}

impl From<&str> for EvaluationStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "acceptable" => Self::Acceptable,
            "considerable" => Self::Considerable,
            "not_acceptable" | "not acceptable" => Self::NotAcceptable,
            _ => Self::Unset,
        }
    }
}

impl From<String> for EvaluationStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl<'de> Deserialize<'de> for EvaluationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(lenient_text(deserializer)?
            .map(Self::from)
            .unwrap_or_default())
    }
}

/// Read any JSON value, keeping only strings and booleans as text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Rating plus the alternative arrangement noted for a failing item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationItem {
    pub status: EvaluationStatus,
    pub alternative: String,
}

impl EvaluationItem {
    pub fn new(status: EvaluationStatus) -> Self {
        Self {
            status,
            alternative: String::new(),
        }
    }
}

/// Section key → item key → rating, as filled in on the evaluation matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationCriteria(BTreeMap<String, BTreeMap<String, EvaluationItem>>);

impl EvaluationCriteria {
    /// Every rubric pair present and unrated.
    pub fn blank(rubric: &RubricSchema) -> Self {
        Self::uniform(rubric, EvaluationStatus::Unset)
    }

    /// Every rubric pair rated with the same status.
    pub fn uniform(rubric: &RubricSchema, status: EvaluationStatus) -> Self {
        let sections = rubric
            .sections()
            .iter()
            .map(|section| {
                let items = section
                    .items
                    .iter()
                    .map(|item| (item.key.clone(), EvaluationItem::new(status)))
                    .collect();
                (section.key.clone(), items)
            })
            .collect();
        Self(sections)
    }

    pub fn item(&self, section: &str, item: &str) -> Option<&EvaluationItem> {
        self.0.get(section).and_then(|items| items.get(item))
    }

    pub fn status(&self, section: &str, item: &str) -> EvaluationStatus {
        self.item(section, item)
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    /// Rate an item. The alternative survives only while the item stays
    /// `NotAcceptable`.
    pub fn set_status(&mut self, section: &str, item: &str, status: EvaluationStatus) {
        let entry = self.entry(section, item);
        entry.status = status;
        if status != EvaluationStatus::NotAcceptable {
            entry.alternative.clear();
        }
    }

    pub fn set_alternative(&mut self, section: &str, item: &str, alternative: impl Into<String>) {
        self.entry(section, item).alternative = alternative.into();
    }

    /// Fill any rubric pair the client omitted and drop alternatives on
    /// items that are not failing.
    pub fn normalize(&mut self, rubric: &RubricSchema) {
        for section in rubric.sections() {
            let items = self.0.entry(section.key.clone()).or_default();
            for item in &section.items {
                items.entry(item.key.clone()).or_default();
            }
        }
        for items in self.0.values_mut() {
            for entry in items.values_mut() {
                if entry.status != EvaluationStatus::NotAcceptable {
                    entry.alternative.clear();
                }
            }
        }
    }

    /// `(section, item)` keys that the rubric does not define.
    pub fn unknown_keys(&self, rubric: &RubricSchema) -> Vec<String> {
        let mut unknown = Vec::new();
        for (section_key, items) in &self.0 {
            match rubric.section(section_key) {
                None => unknown.push(section_key.clone()),
                Some(section) => unknown.extend(
                    items
                        .keys()
                        .filter(|item_key| section.item(item_key).is_none())
                        .map(|item_key| format!("{section_key}.{item_key}")),
                ),
            }
        }
        unknown
    }

    fn entry(&mut self, section: &str, item: &str) -> &mut EvaluationItem {
        self.0
            .entry(section.to_string())
            .or_default()
            .entry(item.to_string())
            .or_default()
    }
}

/// Answer to a yes/no question on the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    #[default]
    Unanswered,
    Yes,
    No,
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Self::Yes,
            "no" | "n" | "false" => Self::No,
            _ => Self::Unanswered,
        }
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(lenient_text(deserializer)?
            .map(Self::from)
            .unwrap_or_default())
    }
}

/// Manual override: `""` and `null` mean the evaluator has not picked one.
fn deserialize_override<'de, D>(deserializer: D) -> Result<Option<AccreditationStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => {
            let key: serde::de::value::StrDeserializer<'_, D::Error> =
                text.trim().into_deserializer();
            AccreditationStatus::deserialize(key).map(Some)
        }
    }
}

/// Accepts `3`, `"3"`, `""` or `null`; the form posts counts as text.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Number(u32),
        Text(String),
    }

    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCount::Number(value)) => Ok(Some(value)),
        Some(RawCount::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawCount::Text(text)) => text
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{text}' is not a whole number"))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralInformation {
    pub boarding_house_name: String,
    pub address: String,
    pub owner_name: String,
    pub landlord_name: String,
    pub manager_visit_schedule: String,
    pub has_officers: Answer,
    pub business_permit: String,
    pub fire_clearance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalSanitation {
    pub house_type: Vec<String>,
    pub water_supply: Vec<String>,
    pub water_storage: Vec<String>,
    pub toilet_type: String,
    pub has_garbage_bins: Answer,
    pub garbage_disposal: Vec<String>,
    pub has_leisure_facilities: Answer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdStatus {
    #[serde(deserialize_with = "deserialize_count")]
    pub total_rooms: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub male_rooms: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub female_rooms: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub total_boarders: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub male_boarders: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub female_boarders: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub occupants_per_room: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub total_comfort_rooms: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub male_comfort_rooms: Option<u32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub female_comfort_rooms: Option<u32>,
    pub has_organization: Answer,
    pub meeting_frequency: String,
    pub has_social_activities: Answer,
}

impl HouseholdStatus {
    /// Breakdowns that exceed their declared totals.
    pub fn inconsistencies(&self) -> Vec<String> {
        let checks = [
            ("rooms", self.total_rooms, self.male_rooms, self.female_rooms),
            (
                "boarders",
                self.total_boarders,
                self.male_boarders,
                self.female_boarders,
            ),
            (
                "comfort rooms",
                self.total_comfort_rooms,
                self.male_comfort_rooms,
                self.female_comfort_rooms,
            ),
        ];

        checks
            .into_iter()
            .filter_map(|(name, total, male, female)| {
                let total = total?;
                let split = u64::from(male.unwrap_or(0)) + u64::from(female.unwrap_or(0));
                (split > u64::from(total)).then(|| {
                    format!("{name}: male and female counts ({split}) exceed total ({total})")
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthInformation {
    pub medical_attendant: String,
    pub seeks_medical_help: Answer,
    pub medical_location: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetySecurity {
    pub has_gate_fence: Answer,
    pub has_fire_extinguisher: Answer,
    pub has_logbook: Answer,
    pub has_visitor_logbook: Answer,
    pub has_curfew: Answer,
    pub curfew_time: String,
    pub visiting_hours: String,
    pub has_headcount: Answer,
    pub has_house_rules: Answer,
    pub rules_discussed: Answer,
    pub disciplinary_actions: String,
    pub common_problems: String,
}

/// Complete accreditation questionnaire for one boarding house.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccreditationForm {
    pub general: GeneralInformation,
    pub sanitation: EnvironmentalSanitation,
    pub household: HouseholdStatus,
    pub health: HealthInformation,
    pub safety: SafetySecurity,
    pub evaluation_criteria: EvaluationCriteria,
    pub other_amenities: BTreeMap<String, bool>,
    /// Evaluator's manual status. Kept apart from the derived decision.
    #[serde(deserialize_with = "deserialize_override")]
    pub evaluation_status: Option<AccreditationStatus>,
}

impl AccreditationForm {
    pub fn blank(rubric: &RubricSchema) -> Self {
        Self {
            evaluation_criteria: EvaluationCriteria::blank(rubric),
            other_amenities: rubric
                .amenities()
                .iter()
                .map(|amenity| (amenity.key.clone(), false))
                .collect(),
            ..Self::default()
        }
    }

    pub fn available_amenities(&self) -> impl Iterator<Item = &str> {
        self.other_amenities
            .iter()
            .filter(|(_, available)| **available)
            .map(|(key, _)| key.as_str())
    }
}

/// Lifecycle of a stored questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    Draft,
    #[default]
    Submitted,
}

impl SubmissionStage {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStage::Draft => "draft",
            SubmissionStage::Submitted => "submitted",
        }
    }
}

/// Payload accepted when storing a questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccreditationSubmission {
    #[serde(default)]
    pub stage: SubmissionStage,
    pub form: AccreditationForm,
}

/// Audit timestamps for stored questionnaires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordTimestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touched(self) -> Self {
        Self {
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}
