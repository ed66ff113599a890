use crate::constants::PAGE_WIDTH_MM;
use crate::types::*;
use serde::{Deserialize, Serialize};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Album generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumSettings {
    /// JPEG quality used when re-encoding images (1-100)
    pub image_quality: u8,
    /// Size limit for each output PDF
    pub max_output_bytes: u64,
    /// Margin around the content of every page
    pub margin_mm: f32,
}

impl Default for AlbumSettings {
    fn default() -> Self {
        Self {
            image_quality: 85,
            max_output_bytes: (15.0 * BYTES_PER_MEGABYTE) as u64,
            margin_mm: 0.0,
        }
    }
}

impl AlbumSettings {
    /// Set the size limit from a megabyte figure
    pub fn with_max_megabytes(mut self, megabytes: f64) -> Self {
        self.max_output_bytes = (megabytes * BYTES_PER_MEGABYTE).round().max(0.0) as u64;
        self
    }

    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AlbumError::Config(format!("Failed to parse settings: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Content width left between the two side margins
    pub fn content_width_mm(&self) -> f32 {
        PAGE_WIDTH_MM - 2.0 * self.margin_mm
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.image_quality) {
            return Err(AlbumError::Config(format!(
                "Image quality must be between 1 and 100, got {}",
                self.image_quality
            )));
        }

        if self.max_output_bytes == 0 {
            return Err(AlbumError::Config(
                "Maximum output size must be greater than zero".to_string(),
            ));
        }

        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 {
            return Err(AlbumError::Config(format!(
                "Margin must be a non-negative number, got {}",
                self.margin_mm
            )));
        }

        if self.content_width_mm() <= 0.0 {
            return Err(AlbumError::Config(format!(
                "Margin of {}mm leaves no room for content on a {}mm wide page",
                self.margin_mm, PAGE_WIDTH_MM
            )));
        }

        Ok(())
    }
}
