use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::balance::DEFAULT_TARGET_WHITE;
use crate::color::Rgb;
use crate::sampler::DEFAULT_SAMPLE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Sampling
    pub sample_size: u32,

    // Correction
    pub linear_space: bool,
    /// Colour the picked point is balanced to
    pub target_white: Rgb,

    // GPU acceleration
    pub gpu_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            linear_space: false,
            target_white: DEFAULT_TARGET_WHITE,
            gpu_enabled: true,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "whitepoint", "Whitepoint")
            .map(|proj_dirs| proj_dirs.config_dir().join("settings.json"))
    }

    /// Load from the user config dir. Missing or broken files give defaults.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Ignoring settings at {}: {:#}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path().context("no config directory for this platform")?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(config_dir) = path.parent() {
            std::fs::create_dir_all(config_dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            bail!("sample_size must be at least 1");
        }
        if !self.target_white.is_finite() {
            bail!("target_white must be finite, got {:?}", self.target_white);
        }
        Ok(())
    }
}
