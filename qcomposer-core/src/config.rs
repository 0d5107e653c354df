//! Configuration management for qcomposer

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::drag::{DragSettings, PointerKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeVariant,
    pub drag: DragConfig,
    pub macros: MacroConfig,
    pub presets: PresetsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeVariant {
    Dark,
    Light,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer class the terminal mouse is treated as
    pub pointer: PointerKind,
    pub touch_dwell_ms: u64,
    /// Movement (in cells) that separates a drag from a click or scroll
    pub move_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub trigger: char,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::Dark,
            drag: DragConfig::default(),
            macros: MacroConfig::default(),
            presets: PresetsConfig::default(),
        }
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pointer: PointerKind::Fine,
            touch_dwell_ms: 150,
            move_threshold: 0.5,
        }
    }
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self { trigger: '/' }
    }
}

impl DragConfig {
    pub fn settings(&self) -> DragSettings {
        DragSettings {
            activation_dwell: Duration::from_millis(self.touch_dwell_ms),
            move_threshold: self.move_threshold.max(0.0),
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qcomposer")
            .map(|proj_dirs| proj_dirs.config_dir().join("qcomposer.toml"))
    }

    /// Load configuration from the platform path, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemeVariant::Dark);
        assert_eq!(config.drag.pointer, PointerKind::Fine);
        assert_eq!(config.drag.touch_dwell_ms, 150);
        assert_eq!(config.macros.trigger, '/');
        assert!(config.presets.path.is_none());
    }

    #[test]
    fn test_drag_settings_from_config() {
        let settings = DragConfig::default().settings();
        assert_eq!(settings.activation_dwell, Duration::from_millis(150));
        assert_eq!(settings.move_threshold, 0.5);
    }

    #[test]
    fn test_load_valid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(
            b"theme = \"Light\"\n\
\n\
[drag]\n\
pointer = \"Coarse\"\n\
touch_dwell_ms = 200\n\
move_threshold = 2.5\n\
\n\
[macros]\n\
trigger = \"#\"\n\
\n\
[presets]\n\
path = \"/tmp/presets.toml\"\n",
        )?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.theme, ThemeVariant::Light);
        assert_eq!(config.drag.pointer, PointerKind::Coarse);
        assert_eq!(config.drag.touch_dwell_ms, 200);
        assert_eq!(config.drag.move_threshold, 2.5);
        assert_eq!(config.macros.trigger, '#');
        assert_eq!(
            config.presets.path.as_deref(),
            Some(Path::new("/tmp/presets.toml"))
        );
        Ok(())
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"[drag]\npointer = \"Coarse\"\n")?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.theme, ThemeVariant::Dark);
        assert_eq!(config.drag.pointer, PointerKind::Coarse);
        assert_eq!(config.drag.touch_dwell_ms, 150);
        Ok(())
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"invalid toml [[[syntax").unwrap();

        let result = Config::load_from(file.path());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_writable_config_rejected() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let mut file = NamedTempFile::new()?;
        file.write_all(b"theme = \"Dark\"\n")?;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666))?;

        assert!(Config::load_from(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_config_path_returns_some() {
        let path = Config::config_path();
        assert!(path.is_some());
        if let Some(p) = path {
            assert!(p.to_string_lossy().ends_with("qcomposer.toml"));
        }
    }

    #[test]
    fn test_config_round_trips_through_toml() -> Result<()> {
        let config = Config {
            theme: ThemeVariant::Light,
            ..Default::default()
        };

        let toml_str = toml::to_string(&config)?;
        assert!(toml_str.contains("Light"));

        let parsed: Config = toml::from_str(&toml_str)?;
        assert_eq!(parsed.theme, ThemeVariant::Light);
        assert_eq!(parsed.macros.trigger, '/');
        Ok(())
    }
}
