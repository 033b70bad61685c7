//! Accreditation likelihood preview from an uploaded photo.

pub mod heuristic;
pub mod router;

pub use heuristic::{confidence_label, ImageSample, LikelihoodHeuristic, Prediction};
pub use router::{prediction_router, PredictionError, MAX_IMAGE_BYTES};
