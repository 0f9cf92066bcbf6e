use anyhow::{Context, Result};
use logweave_types::{CorrelateOptions, ToolFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LOGWEAVE_CONFIG";

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. LOGWEAVE_CONFIG environment variable (with tilde expansion)
/// 3. `<config dir>/logweave/config.toml`
///
/// Returns `None` when no config directory can be determined.
pub fn resolve_config_path(explicit_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(expand_tilde(&env_path));
    }

    dirs::config_dir().map(|dir| dir.join("logweave").join("config.toml"))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Defaults for extraction, overridden by command-line flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub detailed: bool,
    #[serde(default)]
    pub include_thinking: bool,
    /// Categories or tool names; empty selects everything
    #[serde(default)]
    pub tool_filter: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extract: ExtractConfig,
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        match resolve_config_path(explicit_path) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Flags can only switch features on
    pub fn correlate_options(&self, detailed: bool, thinking: bool) -> CorrelateOptions {
        CorrelateOptions {
            detailed: detailed || self.extract.detailed,
            include_thinking: thinking || self.extract.include_thinking,
        }
    }

    /// A non-empty command-line filter replaces the configured one
    pub fn tool_filter(&self, cli_filter: &[String]) -> ToolFilter {
        if cli_filter.is_empty() {
            ToolFilter::from_names(&self.extract.tool_filter)
        } else {
            ToolFilter::from_names(cli_filter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_extract_table_is_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[extract]\ndetailed = true\ntool_filter = [\"file\", \"Grep\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.extract.detailed);
        assert!(!config.extract.include_thinking);

        let options = config.correlate_options(false, true);
        assert!(options.detailed);
        assert!(options.include_thinking);

        let filter = config.tool_filter(&[]);
        assert!(filter.includes_tool("Read"));
        assert!(filter.includes_tool("Grep"));
        assert!(!filter.includes_tool("Glob"));

        let filter = config.tool_filter(&["web".to_string()]);
        assert!(filter.includes_tool("WebSearch"));
        assert!(!filter.includes_tool("Read"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[extract\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid config"));
    }

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(
            resolve_config_path(Some("/etc/logweave.toml")),
            Some(PathBuf::from("/etc/logweave.toml"))
        );
    }
}
