use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_true")]
    pub panel_visible: bool,
    #[serde(default = "default_true")]
    pub fit_on_open: bool,
    #[serde(default)]
    pub recent_projects: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Maximum number of recent projects to remember
const MAX_RECENT_PROJECTS: usize = 10;

impl Default for Config {
    fn default() -> Self {
        Self {
            panel_visible: true,
            fit_on_open: true,
            recent_projects: Vec::new(),
        }
    }
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(config).join("arbor"));
        }
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join(".config").join("arbor"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(data) = fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&data).unwrap_or_default()
    }

    pub fn save(&self) {
        let Some(dir) = Self::config_dir() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("Failed to create config dir: {e}");
            return;
        }
        let Some(path) = Self::config_path() else {
            return;
        };
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    eprintln!("Failed to save config: {e}");
                }
            }
            Err(e) => eprintln!("Failed to serialize config: {e}"),
        }
    }

    /// Add a project id to the recent list (most recent first, deduped).
    pub fn add_recent_project(&mut self, id: &str) {
        self.recent_projects.retain(|p| p != id);
        self.recent_projects.insert(0, id.to_string());
        self.recent_projects.truncate(MAX_RECENT_PROJECTS);
        self.save();
    }
}
