use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::bank::Section;
use crate::session::practice_test::{DEFAULT_TEST_LENGTH, DEFAULT_TIME_LIMIT_SECS, TestPlan};

pub const MIN_TIME_LIMIT_SECS: u32 = 60;
pub const MAX_TEST_LENGTH: usize = 50;
pub const MAX_TIME_LIMIT_SECS: u32 = 3 * 60 * 60;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_test_length")]
    pub test_length: usize,
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u32,
    #[serde(default = "default_low_time_warning_secs")]
    pub low_time_warning_secs: u32,
    #[serde(default)]
    pub default_section: Option<Section>,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_test_length() -> usize {
    DEFAULT_TEST_LENGTH
}
fn default_time_limit_secs() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}
fn default_low_time_warning_secs() -> u32 {
    5 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            test_length: default_test_length(),
            time_limit_secs: default_time_limit_secs(),
            low_time_warning_secs: default_low_time_warning_secs(),
            default_section: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("satprep")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file could get wrong.
    pub fn normalize(&mut self) {
        self.test_length = self.test_length.clamp(1, MAX_TEST_LENGTH);
        self.time_limit_secs = self
            .time_limit_secs
            .clamp(MIN_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS);
        self.low_time_warning_secs = self.low_time_warning_secs.min(self.time_limit_secs);
    }

    pub fn test_plan(&self) -> TestPlan {
        TestPlan {
            length: self.test_length,
            section: self.default_section,
            time_limit_secs: self.time_limit_secs,
        }
    }
}
