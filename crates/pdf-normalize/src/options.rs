use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings shared by every document of a batch run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NormalizeOptions {
    // Target
    pub paper_size: PaperSize,
    pub orientation: Orientation,

    // Rotation for inputs that don't choose their own
    pub default_rotation: RotationRequest,

    // Loading
    pub ignore_encryption: bool,

    // Page policy
    pub skip_degenerate_pages: bool,

    // Documents processed at once; 1 means strictly sequential
    pub concurrency: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            default_rotation: RotationRequest::Clockwise90,
            ignore_encryption: true,
            skip_degenerate_pages: false,
            concurrency: 1,
        }
    }
}

impl NormalizeOptions {
    /// The fixed target box for this run
    pub fn target(&self) -> TargetSpec {
        self.paper_size.target(self.orientation)
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| NormalizeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| NormalizeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let target = self.target();
        if target.validate().is_err() {
            return Err(NormalizeError::Config(format!(
                "Target size must be positive, got {} x {}",
                target.width, target.height
            )));
        }

        if self.concurrency == 0 {
            return Err(NormalizeError::Config(
                "Concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
