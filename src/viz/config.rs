//! Drawing configuration.

use serde::{Deserialize, Serialize};

/// Samples drawn per resample when none is configured.
pub const DEFAULT_SAMPLES: usize = 10_000;

/// Options for [`draw`](super::draw).
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Name of the surface to draw into (the window title in the desktop app).
    pub container: String,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Number of samples per inference run.
    pub samples: usize,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            container: "lcg-viz".to_string(),
            width: 1280,
            height: 720,
            samples: DEFAULT_SAMPLES,
        }
    }
}

impl DrawConfig {
    /// Create a config drawing into `container` with default sizes.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }
}
