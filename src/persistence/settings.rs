use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph_utils::builder::BuildOptions;
use crate::graph_utils::cluster::LayoutSeedConfig;
use crate::graph_utils::nodes::LabelOptions;
use crate::graph_utils::visibility::VisibilityFilter;
use crate::render::EngineOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    // Base URL of the data service; matter ids are appended per request
    #[serde(default = "AppSettings::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    // Label wrapping
    #[serde(default = "AppSettings::default_wrap_width")]
    pub label_wrap_width: usize,
    #[serde(default = "AppSettings::default_address_max")]
    pub address_label_max: usize,
    // Categories shown when a mind map is first opened
    #[serde(default)]
    pub default_visibility: VisibilityFilter,
    #[serde(default)]
    pub layout: LayoutSeedConfig,
    #[serde(default = "AppSettings::default_stabilization_iterations")]
    pub stabilization_iterations: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: Self::default_api_base_url(),
            api_token: None,
            label_wrap_width: Self::default_wrap_width(),
            address_label_max: Self::default_address_max(),
            default_visibility: VisibilityFilter::default(),
            layout: LayoutSeedConfig::default(),
            stabilization_iterations: Self::default_stabilization_iterations(),
        }
    }
}

impl AppSettings {
    fn config_dir() -> PathBuf {
        // Cross-platform user config dir
        #[cfg(target_os = "macos")]
        {
            // ~/Library/Application Support/Mind-Map
            let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("~"));
            return home.join("Library").join("Application Support").join("Mind-Map");
        }
        #[cfg(target_os = "windows")]
        {
            // %APPDATA%\Mind-Map
            if let Ok(appdata) = std::env::var("APPDATA") {
                return PathBuf::from(appdata).join("Mind-Map");
            }
            return PathBuf::from("Mind-Map");
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // $XDG_CONFIG_HOME/Mind-Map or ~/.config/Mind-Map
            if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
                return PathBuf::from(xdg).join("Mind-Map");
            }
            let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("~"));
            return home.join(".config").join("Mind-Map");
        }
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_dir())
    }

    /// Load from `dir`: settings.json first, else migrate a legacy settings.ron,
    /// else defaults.
    pub fn load_from(dir: &std::path::Path) -> anyhow::Result<Self> {
        let json_path = dir.join("settings.json");
        if json_path.exists() {
            let mut f = std::fs::File::open(json_path)?;
            let mut s = String::new();
            f.read_to_string(&mut s)?;
            let v: Self = serde_json::from_str(&s)?;
            return Ok(v);
        }
        let ron_path = dir.join("settings.ron");
        if ron_path.exists() {
            let mut f = std::fs::File::open(&ron_path)?;
            let mut s = String::new();
            f.read_to_string(&mut s)?;
            let v: Self = ron::from_str(&s)?;
            // Save immediately to JSON for future reads, ignore errors silently
            if let Err(e) = v.save_to(dir) {
                log::debug!("settings migration to JSON failed: {}", e);
            }
            return Ok(v);
        }
        Ok(Self::default())
    }

    pub fn save_to(&self, dir: &std::path::Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)?;
        let path = dir.join("settings.json");
        let s = serde_json::to_string_pretty(self)?;
        let mut f = std::fs::File::create(path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Return the directory where the settings file (settings.json) is stored.
    pub fn settings_dir() -> PathBuf {
        Self::config_dir()
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            labels: LabelOptions {
                wrap_width: self.label_wrap_width,
                address_max_chars: self.address_label_max,
            },
            layout: self.layout,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::stabilizing(self.stabilization_iterations)
    }

    pub(crate) fn default_api_base_url() -> String { "http://127.0.0.1:8080/api".to_string() }
    pub(crate) fn default_wrap_width() -> usize { 20 }
    pub(crate) fn default_address_max() -> usize { 25 }
    pub(crate) fn default_stabilization_iterations() -> u32 { 300 }
}
