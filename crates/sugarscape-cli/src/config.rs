//! Configuration management for the Sugarscape CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sugarscape::runtime::config::SimulationConfig;

pub const CONFIG_FILE: &str = "sugarscape.toml";

/// Project configuration, one TOML table per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Chat completions URL; the xAI endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

// Default value functions
fn default_ticks() -> u64 { 15 }
fn default_output_dir() -> PathBuf { PathBuf::from("outputs") }
fn default_model() -> String { "grok-4-fast-non-reasoning".to_string() }
fn default_max_tokens() -> u32 { 150 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            endpoint: None,
        }
    }
}

impl Config {
    /// Load config from sugarscape.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find sugarscape.toml in current or parent directories.
pub fn find_config_file() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?;
    find_config_from(dir)
}

fn find_config_from(mut dir: PathBuf) -> Option<PathBuf> {
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains("[simulation]"));
        assert!(text.contains("grid_size = 30"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.simulation, SimulationConfig::default());
        assert_eq!(parsed.run.ticks, 15);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            "[simulation]\npopulation = 12\nseed = 3\n\n[run]\nticks = 40\n",
        )
        .unwrap();
        assert_eq!(parsed.simulation.population, 12);
        assert_eq!(parsed.simulation.seed, Some(3));
        assert_eq!(parsed.simulation.view_range, 5);
        assert_eq!(parsed.run.ticks, 40);
        assert_eq!(parsed.run.output_dir, PathBuf::from("outputs"));
        assert_eq!(parsed.llm.max_tokens, 150);
    }

    #[test]
    fn test_search_walks_upward() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        Config::default().save(&root.path().join(CONFIG_FILE)).unwrap();

        let found = find_config_from(nested).unwrap();
        assert_eq!(found, root.path().join(CONFIG_FILE));
        assert!(Config::load_from(&found).is_ok());
    }
}
