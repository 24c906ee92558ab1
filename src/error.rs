use thiserror::Error;

use crate::services::pipeline::Stage;

/// Outcome code delivered to every conversion callback.
///
/// Each failure variant belongs to exactly one pipeline stage:
/// encoding the markup as a data locator, loading it into a decoded image,
/// drawing that image onto a surface, and exporting the surface as bytes.
/// `UriEncodingFailed`/`ImgLoadingFailed` usually mean broken markup;
/// `CanvasDrawingFailed`/`BlobExportFailed` usually mean the output
/// parameters are invalid or unsupported by the host (e.g. the output is
/// too large).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RasterError {
    #[error("Markup successfully rasterized")]
    None = 0,

    #[error("No input data")]
    NoInputData = 1,

    #[error("Unable to encode markup as data locator")]
    UriEncodingFailed = 2,

    #[error("Unable to load markup as image")]
    ImgLoadingFailed = 3,

    #[error("Unable to draw image on surface")]
    CanvasDrawingFailed = 4,

    #[error("Unable to export bytes from surface")]
    BlobExportFailed = 5,
}

impl RasterError {
    /// Stable identifier for this code.
    pub fn label(self) -> &'static str {
        match self {
            RasterError::None => "RasterError::None",
            RasterError::NoInputData => "RasterError::NoInputData",
            RasterError::UriEncodingFailed => "RasterError::UriEncodingFailed",
            RasterError::ImgLoadingFailed => "RasterError::ImgLoadingFailed",
            RasterError::CanvasDrawingFailed => "RasterError::CanvasDrawingFailed",
            RasterError::BlobExportFailed => "RasterError::BlobExportFailed",
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_error(self) -> bool {
        self != RasterError::None
    }

    /// The pipeline stage that produces this code, if any.
    ///
    /// `None` and `NoInputData` never come from the host pipeline.
    pub fn stage(self) -> Option<Stage> {
        match self {
            RasterError::None | RasterError::NoInputData => None,
            RasterError::UriEncodingFailed => Some(Stage::Encoding),
            RasterError::ImgLoadingFailed => Some(Stage::Loading),
            RasterError::CanvasDrawingFailed => Some(Stage::Drawing),
            RasterError::BlobExportFailed => Some(Stage::Exporting),
        }
    }
}

/// Failure detail reported by a host primitive.
///
/// Never reaches a conversion callback; the executor logs it and maps it to
/// the [`RasterError`] of the stage it happened in.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("Invalid surface size: {width}x{height}")]
    InvalidSurface { width: f32, height: f32 },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

/// Failure of an awaited conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("Conversion was dropped before it finished")]
    Abandoned,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
