use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Points per inch, used to convert typographic sizes into pixels.
const POINTS_PER_INCH: f64 = 72.0;

/// Output settings shared by every renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub output: PathBuf,
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    pub annotate_origin: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("antenna_map_final.png"),
            dpi: 300,
            width_in: 15.0,
            height_in: 7.0,
            annotate_origin: false,
        }
    }
}

impl RenderConfig {
    /// Figure size in pixels at the configured DPI.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Converts a size in typographic points into pixels.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * f64::from(self.dpi) / POINTS_PER_INCH
    }

    pub fn validate(&self) -> MapResult<()> {
        if self.dpi == 0 {
            return Err(MapError::InvalidInput("dpi must be positive".into()));
        }
        if !(self.width_in > 0.0 && self.height_in > 0.0) {
            return Err(MapError::InvalidInput(format!(
                "figure size {}x{} in is not positive",
                self.width_in, self.height_in
            )));
        }
        Ok(())
    }
}

/// Common error type for the projection, framing, and rendering steps.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("projection failure: {0}")]
    Projection(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("render failure: {0}")]
    Render(String),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MapResult<T> = Result<T, MapError>;
