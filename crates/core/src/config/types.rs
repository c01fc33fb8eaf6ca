use serde::{Deserialize, Serialize};

use crate::convert::EngineConfig;
use crate::registry::VideoPreset;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Default qualities applied when a request leaves quality unset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_image_quality")]
    pub image_quality: u8,
    #[serde(default = "default_video_preset")]
    pub video_preset: VideoPreset,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            image_quality: default_image_quality(),
            video_preset: default_video_preset(),
        }
    }
}

fn default_image_quality() -> u8 {
    85
}

fn default_video_preset() -> VideoPreset {
    VideoPreset::Medium
}
