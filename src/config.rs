//! Run configuration: defaults, validation and derived sizes.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_OUTPUT: &str = "csma_performance_analysis_adjusted.png";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_START: f64 = 0.0;
pub const DEFAULT_END: f64 = 10.0;
pub const DEFAULT_POINTS: usize = 50;
pub const DEFAULT_WIDTH_IN: f64 = 20.0;
pub const DEFAULT_HEIGHT_IN: f64 = 16.0;
pub const DEFAULT_DPI: u32 = 300;

/// Points per inch, used to turn font sizes into pixels
const POINTS_PER_INCH: f64 = 72.0;

/// Rejected option values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("need at least 2 time points, got {0}")]
    TooFewPoints(usize),
    #[error("time range start must not be negative, got {0}")]
    NegativeStart(f64),
    #[error("time range end ({end}) must be greater than start ({start})")]
    EmptyRange { start: f64, end: f64 },
    #[error("dpi must be positive")]
    ZeroDpi,
    #[error("figure size must be positive, got {width}x{height} inches")]
    FigureSize { width: f64, height: f64 },
    #[error("unsupported output format '{0}', expected .png or .svg")]
    UnsupportedFormat(String),
}

/// Output image encoding, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }
}

/// Check the synthetic time axis parameters
pub fn validate_range(start: f64, end: f64, points: usize) -> Result<(), ConfigError> {
    if points < 2 {
        return Err(ConfigError::TooFewPoints(points));
    }
    if !(start >= 0.0) {
        return Err(ConfigError::NegativeStart(start));
    }
    if !(end > start) {
        return Err(ConfigError::EmptyRange { start, end });
    }
    Ok(())
}

/// Figure geometry and output location
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output: PathBuf,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    /// TrueType font to use instead of searching system paths
    pub font: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            width_in: DEFAULT_WIDTH_IN,
            height_in: DEFAULT_HEIGHT_IN,
            dpi: DEFAULT_DPI,
            font: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<ImageFormat, ConfigError> {
        if self.dpi == 0 {
            return Err(ConfigError::ZeroDpi);
        }
        if !(self.width_in > 0.0 && self.height_in > 0.0) {
            return Err(ConfigError::FigureSize {
                width: self.width_in,
                height: self.height_in,
            });
        }
        ImageFormat::from_path(&self.output)
    }

    /// Canvas size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        )
    }

    /// Convert a size in points to pixels at the configured DPI
    pub fn px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / POINTS_PER_INCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_300_dpi() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.pixel_size(), (6000, 4800));
        assert_eq!(cfg.validate(), Ok(ImageFormat::Png));
        assert_eq!(cfg.px(72.0), 300.0);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ImageFormat::from_path(Path::new("out.SVG")),
            Ok(ImageFormat::Svg)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("out.jpg")),
            Err(ConfigError::UnsupportedFormat("jpg".to_string()))
        );
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn rejects_bad_geometry() {
        let cfg = RenderConfig {
            dpi: 0,
            ..RenderConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDpi));

        let cfg = RenderConfig {
            width_in: 0.0,
            ..RenderConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::FigureSize { .. })));
    }

    #[test]
    fn range_validation() {
        assert!(validate_range(0.0, 10.0, 50).is_ok());
        assert_eq!(validate_range(0.0, 10.0, 1), Err(ConfigError::TooFewPoints(1)));
        assert_eq!(
            validate_range(5.0, 5.0, 10),
            Err(ConfigError::EmptyRange { start: 5.0, end: 5.0 })
        );
        assert_eq!(
            validate_range(-1.0, 10.0, 50),
            Err(ConfigError::NegativeStart(-1.0))
        );
    }
}
