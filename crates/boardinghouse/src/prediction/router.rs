use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{debug, warn};

use super::heuristic::{ImageSample, LikelihoodHeuristic};

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
// Headroom for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;
const IMAGE_FIELD: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Image is required for prediction.")]
    MissingImage,
    #[error("image exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
    #[error("unsupported image type '{0}'")]
    UnsupportedMediaType(String),
    #[error("malformed upload: {0}")]
    Malformed(String),
}

impl PredictionError {
    fn status(&self) -> StatusCode {
        match self {
            PredictionError::MissingImage | PredictionError::Malformed(_) => StatusCode::BAD_REQUEST,
            PredictionError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PredictionError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (self.status(), Json(payload)).into_response()
    }
}

/// Image likelihood preview endpoint.
pub fn prediction_router(heuristic: Arc<LikelihoodHeuristic>) -> Router {
    Router::new()
        .route("/api/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD))
        .with_state(heuristic)
}

/// Declared content type when present, otherwise a guess from the file name.
fn check_image_type(content_type: Option<&str>, file_name: &str) -> Result<(), PredictionError> {
    let declared = content_type
        .filter(|value| !value.is_empty() && *value != "application/octet-stream")
        .map(|value| value.parse::<mime::Mime>().map_err(|_| value.to_string()));
    let mime = match declared {
        Some(Ok(mime)) => mime,
        Some(Err(raw)) => return Err(PredictionError::UnsupportedMediaType(raw)),
        None => mime_guess::from_path(file_name)
            .first()
            .ok_or_else(|| PredictionError::UnsupportedMediaType(file_name.to_string()))?,
    };

    if mime.type_() == mime::IMAGE {
        Ok(())
    } else {
        Err(PredictionError::UnsupportedMediaType(mime.essence_str().to_string()))
    }
}

async fn read_image(mut multipart: Multipart) -> Result<ImageSample, PredictionError> {
    while let Some(field) = multipart.next_field().await.map_err(|error| {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PredictionError::TooLarge {
                limit: MAX_IMAGE_BYTES,
            }
        } else {
            PredictionError::Malformed(error.body_text())
        }
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        check_image_type(field.content_type(), &file_name)?;

        let bytes = field.bytes().await.map_err(|error| {
            if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
                PredictionError::TooLarge {
                    limit: MAX_IMAGE_BYTES,
                }
            } else {
                PredictionError::Malformed(error.body_text())
            }
        })?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(PredictionError::TooLarge {
                limit: MAX_IMAGE_BYTES,
            });
        }

        return Ok(ImageSample {
            file_name,
            size_bytes: bytes.len(),
        });
    }

    Err(PredictionError::MissingImage)
}

pub(crate) async fn predict_handler(
    State(heuristic): State<Arc<LikelihoodHeuristic>>,
    multipart: Multipart,
) -> Response {
    match read_image(multipart).await {
        Ok(sample) => {
            let prediction = heuristic.predict(&sample);
            debug!(
                file = %sample.file_name,
                bytes = sample.size_bytes,
                likelihood = prediction.likelihood,
                "image likelihood predicted"
            );
            (StatusCode::OK, Json(prediction)).into_response()
        }
        Err(error) => {
            warn!(error = %error, "prediction upload rejected");
            error.into_response()
        }
    }
}
