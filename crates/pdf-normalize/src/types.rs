use crate::constants::{A4_HEIGHT_PT, A4_WIDTH_PT, LETTER_HEIGHT_PT, LETTER_WIDTH_PT};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to load PDF: {0}")]
    Load(#[source] lopdf::Error),
    #[error("PDF is encrypted and encryption bypass is disabled")]
    Encrypted,
    #[error("Degenerate page geometry: {width} x {height}")]
    DegenerateGeometry { width: f64, height: f64 },
    #[error("Page {0:?} has no usable MediaBox")]
    MissingMediaBox(lopdf::ObjectId),
    #[error("Failed to save PDF: {0}")]
    Serialization(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Target paper presets, in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    /// 594.96 x 841.92, slightly off the ISO dimensions
    #[default]
    A4,
    Letter,
    Custom { width_pt: f64, height_pt: f64 },
}

impl PaperSize {
    /// Get base dimensions (always portrait for the named presets)
    pub fn dimensions_pt(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (A4_WIDTH_PT, A4_HEIGHT_PT),
            PaperSize::Letter => (LETTER_WIDTH_PT, LETTER_HEIGHT_PT),
            PaperSize::Custom {
                width_pt,
                height_pt,
            } => (width_pt, height_pt),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions_pt();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// The fixed target box for a run
    pub fn target(self, orientation: Orientation) -> TargetSpec {
        let (width, height) = self.dimensions_with_orientation(orientation);
        TargetSpec { width, height }
    }
}

/// Rotation requested for every page of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub enum RotationRequest {
    CounterClockwise90,
    None,
    #[default]
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl RotationRequest {
    pub fn degrees(self) -> i32 {
        match self {
            RotationRequest::CounterClockwise90 => -90,
            RotationRequest::None => 0,
            RotationRequest::Clockwise90 => 90,
            RotationRequest::Clockwise180 => 180,
            RotationRequest::Clockwise270 => 270,
        }
    }
}

impl TryFrom<i32> for RotationRequest {
    type Error = NormalizeError;

    fn try_from(degrees: i32) -> Result<Self> {
        match degrees {
            -90 => Ok(RotationRequest::CounterClockwise90),
            0 => Ok(RotationRequest::None),
            90 => Ok(RotationRequest::Clockwise90),
            180 => Ok(RotationRequest::Clockwise180),
            270 => Ok(RotationRequest::Clockwise270),
            other => Err(NormalizeError::Config(format!(
                "Unsupported rotation {}°, expected one of -90, 0, 90, 180, 270",
                other
            ))),
        }
    }
}

impl From<RotationRequest> for i32 {
    fn from(rotation: RotationRequest) -> Self {
        rotation.degrees()
    }
}

impl std::str::FromStr for RotationRequest {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        let degrees: i32 = s
            .trim()
            .trim_end_matches('°')
            .parse()
            .map_err(|_| NormalizeError::Config(format!("Invalid rotation: {:?}", s)))?;
        Self::try_from(degrees)
    }
}

/// Current page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Fails unless both sides are positive and finite
    pub fn validate(self) -> Result<Self> {
        if self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
        {
            Ok(self)
        } else {
            Err(NormalizeError::DegenerateGeometry {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Target page box shared by every page of a run
pub type TargetSpec = PageBox;

/// How a page is brought to the target size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResizeMode {
    /// Box replaced outright, content scaled uniformly and centered
    FitCenter,
    /// Box and content scaled together per axis
    Stretch,
}

/// Everything needed to mutate one page
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformPlan {
    pub mode: ResizeMode,
    pub box_size: PageBox,
    pub content_scale: (f64, f64),
    pub translation: (i64, i64),
    /// Raw sum of request and current rotation, not wrapped
    pub final_rotation_degrees: i32,
}
