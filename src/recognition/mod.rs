//! Freehand recognition: reduce the capture to a stroke description and let
//! the gateway name the character.

pub mod strokes;

use serde::Serialize;

use crate::services::gateway::{ContentGateway, GatewayError, Identification};
use strokes::{analyze, describe, Point, StrokeSummary};

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("no drawing provided")]
    EmptyDrawing,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
    pub description: String,
    pub strokes: Vec<StrokeSummary>,
    pub identification: Identification,
}

/// The capture arrives as the canvas recorded it; pen lifts are recovered
/// from the gaps, not from the grouping.
pub async fn recognize(
    gateway: &dyn ContentGateway,
    captured: &[Vec<Point>],
) -> Result<Recognition, RecognitionError> {
    let points: Vec<Point> = captured.iter().flatten().copied().collect();
    if points.is_empty() {
        return Err(RecognitionError::EmptyDrawing);
    }

    let description = describe(&points);
    let strokes = analyze(&points);
    tracing::debug!(strokes = strokes.len(), "Drawing described");

    let identification = gateway.identify_from_description(&description).await?;
    Ok(Recognition {
        description,
        strokes,
        identification,
    })
}
