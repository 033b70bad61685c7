use regex::Regex;
use serde::Serialize;

const BASE_LIKELIHOOD: f64 = 0.45;
const NAME_SIGNAL: f64 = 0.08;
const SIZE_WEIGHT: f64 = 0.12;
const SIZE_SIGNAL_CAP: f64 = 0.25;
const FLOOR: f64 = 0.05;
const CEILING: f64 = 0.95;

pub const EXPLANATION: &str = "This heuristic preview considers filename cues and basic file \
metrics as placeholders for a trained model.";

/// Uploaded photo as seen by the heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    pub file_name: String,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub likelihood: f64,
    pub label: &'static str,
    pub explanation: &'static str,
}

/// Filename and file-size heuristic standing in for an image model.
#[derive(Debug, Clone)]
pub struct LikelihoodHeuristic {
    name_cues: Regex,
}

pub const NAME_CUES: &str = r"(?i)clean|safe|accredit|pass|updated";

impl LikelihoodHeuristic {
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_cues(NAME_CUES)
    }

    /// Heuristic with a custom filename cue pattern.
    pub fn with_cues(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name_cues: Regex::new(pattern)?,
        })
    }

    pub fn likelihood(&self, sample: &ImageSample) -> f64 {
        let size_kb = sample.size_bytes as f64 / 1024.0;
        let name_signal = if self.name_cues.is_match(&sample.file_name) {
            NAME_SIGNAL
        } else {
            0.0
        };
        let size_signal = ((size_kb + 10.0).log10() * SIZE_WEIGHT).min(SIZE_SIGNAL_CAP);
        (BASE_LIKELIHOOD + name_signal + size_signal).clamp(FLOOR, CEILING)
    }

    pub fn predict(&self, sample: &ImageSample) -> Prediction {
        let likelihood = self.likelihood(sample);
        Prediction {
            likelihood,
            label: confidence_label(likelihood),
            explanation: EXPLANATION,
        }
    }
}

pub fn confidence_label(likelihood: f64) -> &'static str {
    if likelihood >= 0.65 {
        "High confidence"
    } else if likelihood >= 0.4 {
        "Moderate confidence"
    } else {
        "Low confidence"
    }
}
