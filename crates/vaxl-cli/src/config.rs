use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "vaxl.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// One `<contract>.json` world-state file per contract lives here.
    pub state_dir: PathBuf,
    pub log_filter: String,
    /// Whether the stores answer selector queries.
    pub rich_query: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".vaxl"),
            log_filter: "info".into(),
            rich_query: true,
        }
    }
}

impl CliConfig {
    /// Load `path`, or `vaxl.toml` if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn with_state_dir(mut self, state_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = state_dir {
            self.state_dir = dir;
        }
        self
    }

    /// World-state file backing `contract`.
    pub fn state_file(&self, contract: &str) -> PathBuf {
        self.state_dir.join(format!("{contract}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert_eq!(c.state_dir, PathBuf::from(".vaxl"));
        assert_eq!(c.log_filter, "info");
        assert!(c.rich_query);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaxl.toml");
        std::fs::write(&path, "rich_query = false\n").unwrap();
        let c = CliConfig::from_file(&path).unwrap();
        assert!(!c.rich_query);
        assert_eq!(c.log_filter, "info");
    }

    #[test]
    fn full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaxl.toml");
        std::fs::write(
            &path,
            concat!(
                "state_dir = \"/var/lib/vaxl\"\n",
                "log_filter = \"vaxl_ledger=debug\"\n",
                "rich_query = true\n",
            ),
        )
        .unwrap();
        let c = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(c.state_dir, PathBuf::from("/var/lib/vaxl"));
        assert_eq!(c.log_filter, "vaxl_ledger=debug");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaxl.toml");
        std::fs::write(&path, "statedir = \"x\"\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn state_dir_override() {
        let c = CliConfig::default().with_state_dir(Some("/tmp/x".into()));
        assert_eq!(c.state_file("dose"), PathBuf::from("/tmp/x/dose.json"));
        let c = c.with_state_dir(None);
        assert_eq!(c.state_dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn round_trips_through_toml() {
        let c = CliConfig {
            state_dir: "state".into(),
            log_filter: "warn".into(),
            rich_query: false,
        };
        let text = toml::to_string(&c).unwrap();
        assert_eq!(toml::from_str::<CliConfig>(&text).unwrap(), c);
    }
}
