use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub last_input_folder: Option<PathBuf>,
    pub last_output_folder: Option<PathBuf>,
    pub overwrite: bool,
    pub keep_intermediate: bool,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_input_folder: None,
            last_output_folder: None,
            overwrite: false,
            keep_intermediate: false,
            window_width: 800.0,
            window_height: 1000.0,
        }
    }
}

impl AppConfig {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("convertext").join("config.json"))
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    match serde_json::from_str::<AppConfig>(&content) {
                        Ok(config) => return config,
                        Err(e) => {
                            tracing::warn!("failed to parse config, using defaults: {}", e)
                        }
                    }
                }
            }
        }

        Self::default()
    }

    pub fn save(&self) {
        let Some(config_path) = Self::config_path() else {
            return;
        };

        if let Some(parent) = config_path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }

        if let Ok(content) = serde_json::to_string_pretty(self) {
            if let Err(e) = std::fs::write(&config_path, content) {
                tracing::warn!("failed to save config: {}", e);
            }
        }
    }

    pub fn update_input_folder(&mut self, path: Option<PathBuf>) {
        self.last_input_folder = path;
        self.save();
    }

    pub fn update_output_folder(&mut self, path: Option<PathBuf>) {
        self.last_output_folder = path;
        self.save();
    }
}
