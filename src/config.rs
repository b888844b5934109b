use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Display width used to reflow a selected log line into the detail pane.
pub const DETAIL_WRAP_WIDTH: usize = 150;
/// Text lines visible in the detail pane.
pub const DETAIL_PANE_LINES: u16 = 5;

const DEFAULT_NAMESPACE_WIDTH: u16 = 35;
const DEFAULT_POD_WIDTH: u16 = 70;
const DEFAULT_CONTAINER_WIDTH: u16 = 30;
const DEFAULT_LOG_WIDTH: u16 = 114;
const DEFAULT_TAIL_LINES: i64 = 500;

/// Immutable settings built once at startup and shared by reference with the
/// controller, the gateway and the renderer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayConfig {
    pub source: Option<String>,
    pub namespace_width: u16,
    pub pod_width: u16,
    pub container_width: u16,
    pub log_width: u16,
    pub detail_width: usize,
    pub tail_lines: Option<i64>,
    pub timestamps: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            source: None,
            namespace_width: DEFAULT_NAMESPACE_WIDTH,
            pod_width: DEFAULT_POD_WIDTH,
            container_width: DEFAULT_CONTAINER_WIDTH,
            log_width: DEFAULT_LOG_WIDTH,
            detail_width: DETAIL_WRAP_WIDTH,
            tail_lines: Some(DEFAULT_TAIL_LINES),
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct KlvConfigFile {
    #[serde(default)]
    columns: ColumnsSpec,
    #[serde(default)]
    logs: LogsSpec,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ColumnsSpec {
    #[serde(default, alias = "ns")]
    namespaces: Option<u16>,
    #[serde(default, alias = "po")]
    pods: Option<u16>,
    #[serde(default)]
    containers: Option<u16>,
    #[serde(default)]
    logs: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
struct LogsSpec {
    #[serde(default = "default_tail_lines", alias = "tail")]
    tail_lines: i64,
    #[serde(default)]
    timestamps: bool,
}

impl Default for LogsSpec {
    fn default() -> Self {
        Self {
            tail_lines: DEFAULT_TAIL_LINES,
            timestamps: false,
        }
    }
}

impl DisplayConfig {
    pub fn load() -> Result<Self> {
        match discover_config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_yaml(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.source = Some(path.display().to_string());
        Ok(config)
    }

    fn from_yaml(raw: &str) -> Result<Self> {
        let parsed: KlvConfigFile = if raw.trim().is_empty() {
            KlvConfigFile::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        let defaults = Self::default();

        Ok(Self {
            source: None,
            namespace_width: column_width(parsed.columns.namespaces, defaults.namespace_width),
            pod_width: column_width(parsed.columns.pods, defaults.pod_width),
            container_width: column_width(parsed.columns.containers, defaults.container_width),
            log_width: column_width(parsed.columns.logs, defaults.log_width),
            detail_width: DETAIL_WRAP_WIDTH,
            // Zero or negative means "no tail limit".
            tail_lines: (parsed.logs.tail_lines > 0).then_some(parsed.logs.tail_lines),
            timestamps: parsed.logs.timestamps,
        })
    }
}

fn column_width(value: Option<u16>, fallback: u16) -> u16 {
    value.filter(|width| *width > 0).unwrap_or(fallback)
}

fn default_tail_lines() -> i64 {
    DEFAULT_TAIL_LINES
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KLV_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [PathBuf::from("klv.yaml"), PathBuf::from(".klv.yaml")];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/klv/config.yaml"),
            PathBuf::from(&home).join(".config/klv/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{DETAIL_WRAP_WIDTH, DisplayConfig};

    #[test]
    fn empty_file_yields_defaults() {
        let config = DisplayConfig::from_yaml("").expect("parse");
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(config.detail_width, 150);
    }

    #[test]
    fn partial_columns_keep_other_defaults() {
        let config = DisplayConfig::from_yaml("columns:\n  pods: 90\n  logs: 0\n").expect("parse");
        assert_eq!(config.pod_width, 90);
        assert_eq!(config.namespace_width, 35);
        assert_eq!(config.log_width, 114);
    }

    #[test]
    fn wrap_width_is_not_configurable() {
        let config = DisplayConfig::from_yaml("detail_width: 40\ncolumns:\n  ns: 20\n")
            .expect("unknown keys are ignored");
        assert_eq!(config.namespace_width, 20);
        assert_eq!(config.detail_width, DETAIL_WRAP_WIDTH);
    }

    #[test]
    fn non_positive_tail_disables_limit() {
        let config = DisplayConfig::from_yaml("logs:\n  tail_lines: 0\n  timestamps: true\n")
            .expect("parse");
        assert_eq!(config.tail_lines, None);
        assert!(config.timestamps);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(DisplayConfig::from_yaml("columns: [1, 2").is_err());
    }
}
