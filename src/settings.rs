//! Import settings with persistence
//!
//! Settings are saved to `~/.config/mosaic/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use mosaic_process::{PostProcessSteps, ProcessConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which steps to run and how they are tuned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub steps: StepSettings,
    pub process: ProcessConfig,
}

impl ImportSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mosaic"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Step selection, one switch per post-processing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSettings {
    pub validate: bool,
    pub pretransform_vertices: bool,
    pub triangulate: bool,
    pub join_identical_vertices: bool,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            validate: true,
            pretransform_vertices: false,
            triangulate: true,
            join_identical_vertices: true,
        }
    }
}

impl StepSettings {
    /// The selected steps as pipeline flags
    pub fn flags(&self) -> PostProcessSteps {
        let mut flags = PostProcessSteps::empty();
        flags.set(PostProcessSteps::VALIDATE_DATA_STRUCTURE, self.validate);
        flags.set(PostProcessSteps::PRE_TRANSFORM_VERTICES, self.pretransform_vertices);
        flags.set(PostProcessSteps::TRIANGULATE, self.triangulate);
        flags.set(PostProcessSteps::JOIN_IDENTICAL_VERTICES, self.join_identical_vertices);
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::{Mat4, Vec3};

    #[test]
    fn default_steps() {
        assert_eq!(
            StepSettings::default().flags(),
            PostProcessSteps::VALIDATE_DATA_STRUCTURE
                | PostProcessSteps::TRIANGULATE
                | PostProcessSteps::JOIN_IDENTICAL_VERTICES
        );
    }

    #[test]
    fn saved_settings_load_back() {
        let path = std::env::temp_dir()
            .join(format!("mosaic-settings-{}", std::process::id()))
            .join("settings.toml");

        let mut settings = ImportSettings::default();
        settings.steps.pretransform_vertices = true;
        settings.process.join_vertices.epsilon = 1e-3;
        settings.process.pretransform.root_transformation = Some(Mat4::from_scale(Vec3::splat(0.01)));
        settings.save_to(&path).unwrap();

        assert_eq!(ImportSettings::load_from(&path), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: ImportSettings = toml::from_str("[steps]\ntriangulate = false\n").unwrap();
        assert!(!settings.steps.triangulate);
        assert!(settings.steps.validate);
        assert_eq!(settings.process, ProcessConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = ImportSettings::load_from(Path::new("/nonexistent/settings.toml"));
        assert_eq!(settings, ImportSettings::default());
    }
}
