use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

const MAX_STARTUP_RETRY_DELAY_MS: u64 = 10_000;

/// The commented default config, as written by `emptydesk-cli config reset`.
pub const DEFAULT_CONFIG: &str = include_str!("../../emptydesk.default.toml");

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_default()
        .join("emptydesk")
}
pub fn config_file() -> PathBuf { config_dir().join("config.toml") }

/// Which landing surface to open when a trigger fires.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LandingSurface {
    /// The plain overview.
    #[default]
    Overview,
    /// The overview, switched to the grid of all applications.
    Applications,
    /// The overview, switched to the frequently used applications.
    Frequent,
}

/// A single preference change, as issued by the preferences CLI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigCommand {
    SetOnCurrentWorkspaceEmpty(bool),
    SetOnLastWorkspaceEmpty(bool),
    SetOnStartup(bool),
    SetIgnoreMinimizedWindows(bool),
    SetIgnoreSecondaryMonitorWindows(bool),
    SetStartupRetryDelayMs(u64),

    SetLandingOnCurrentEmpty(LandingSurface),
    SetLandingOnLastWorkspaceEmpty(LandingSurface),
    SetLandingOnStartup(LandingSurface),
}

impl ConfigCommand {
    /// Every key accepted by [`ConfigCommand::parse`] and [`Config::get`].
    pub const KEYS: &'static [&'static str] = &[
        "settings.on_current_workspace_empty",
        "settings.on_last_workspace_empty",
        "settings.on_startup",
        "settings.ignore_minimized_windows",
        "settings.ignore_secondary_monitor_windows",
        "settings.startup_retry_delay_ms",
        "landing.on_current_empty",
        "landing.on_last_workspace_empty",
        "landing.on_startup",
    ];

    pub fn parse(key: &str, value: &str) -> anyhow::Result<ConfigCommand> {
        fn flag(value: &str) -> anyhow::Result<bool> {
            match value {
                "true" | "on" | "yes" | "1" => Ok(true),
                "false" | "off" | "no" | "0" => Ok(false),
                _ => bail!("expected a boolean, got '{value}'"),
            }
        }
        fn surface(value: &str) -> anyhow::Result<LandingSurface> {
            LandingSurface::from_str(value).ok().with_context(|| {
                format!(
                    "expected one of {}, got '{value}'",
                    LandingSurface::VARIANTS.join(", ")
                )
            })
        }

        let cmd = match key {
            "settings.on_current_workspace_empty" => Self::SetOnCurrentWorkspaceEmpty(flag(value)?),
            "settings.on_last_workspace_empty" => Self::SetOnLastWorkspaceEmpty(flag(value)?),
            "settings.on_startup" => Self::SetOnStartup(flag(value)?),
            "settings.ignore_minimized_windows" => Self::SetIgnoreMinimizedWindows(flag(value)?),
            "settings.ignore_secondary_monitor_windows" => {
                Self::SetIgnoreSecondaryMonitorWindows(flag(value)?)
            }
            "settings.startup_retry_delay_ms" => Self::SetStartupRetryDelayMs(
                value.parse().with_context(|| format!("expected milliseconds, got '{value}'"))?,
            ),
            "landing.on_current_empty" => Self::SetLandingOnCurrentEmpty(surface(value)?),
            "landing.on_last_workspace_empty" => {
                Self::SetLandingOnLastWorkspaceEmpty(surface(value)?)
            }
            "landing.on_startup" => Self::SetLandingOnStartup(surface(value)?),
            _ => bail!("unknown key '{key}'"),
        };
        Ok(cmd)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub landing: LandingSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Open a landing surface when the last window on the current workspace
    /// closes while other workspaces remain.
    #[serde(default = "yes")]
    pub on_current_workspace_empty: bool,
    /// Open a landing surface when the last real workspace empties. Only
    /// meaningful with dynamic workspaces.
    #[serde(default = "yes")]
    pub on_last_workspace_empty: bool,
    #[serde(default = "yes")]
    pub on_startup: bool,
    #[serde(default)]
    pub ignore_minimized_windows: bool,
    /// Only windows on the primary monitor count, and closing windows on other
    /// monitors never triggers.
    #[serde(default)]
    pub ignore_secondary_monitor_windows: bool,
    /// Delay before the single startup retry, for shells that are not fully
    /// up when we activate.
    #[serde(default = "default_startup_retry_delay_ms")]
    pub startup_retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            on_current_workspace_empty: true,
            on_last_workspace_empty: true,
            on_startup: true,
            ignore_minimized_windows: false,
            ignore_secondary_monitor_windows: false,
            startup_retry_delay_ms: default_startup_retry_delay_ms(),
        }
    }
}

impl Settings {
    pub fn startup_retry_delay(&self) -> Duration {
        Duration::from_millis(self.startup_retry_delay_ms)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.startup_retry_delay_ms == 0 {
            issues.push("startup_retry_delay_ms must be at least 1".to_string());
        }
        if self.startup_retry_delay_ms > MAX_STARTUP_RETRY_DELAY_MS {
            issues.push(format!(
                "startup_retry_delay_ms should not exceed {MAX_STARTUP_RETRY_DELAY_MS}"
            ));
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        if self.startup_retry_delay_ms == 0
            || self.startup_retry_delay_ms > MAX_STARTUP_RETRY_DELAY_MS
        {
            self.startup_retry_delay_ms = default_startup_retry_delay_ms();
            fixes += 1;
        }
        fixes
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LandingSettings {
    #[serde(default)]
    pub on_current_empty: LandingSurface,
    #[serde(default)]
    pub on_last_workspace_empty: LandingSurface,
    #[serde(default)]
    pub on_startup: LandingSurface,
}

fn yes() -> bool { true }

fn default_startup_retry_delay_ms() -> u64 { 1000 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&buf)
    }

    /// Reads `path`, falling back to the defaults if it does not exist yet.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Config::default()) }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    pub fn apply(&mut self, cmd: ConfigCommand) {
        match cmd {
            ConfigCommand::SetOnCurrentWorkspaceEmpty(v) => {
                self.settings.on_current_workspace_empty = v
            }
            ConfigCommand::SetOnLastWorkspaceEmpty(v) => self.settings.on_last_workspace_empty = v,
            ConfigCommand::SetOnStartup(v) => self.settings.on_startup = v,
            ConfigCommand::SetIgnoreMinimizedWindows(v) => {
                self.settings.ignore_minimized_windows = v
            }
            ConfigCommand::SetIgnoreSecondaryMonitorWindows(v) => {
                self.settings.ignore_secondary_monitor_windows = v
            }
            ConfigCommand::SetStartupRetryDelayMs(v) => self.settings.startup_retry_delay_ms = v,
            ConfigCommand::SetLandingOnCurrentEmpty(v) => self.landing.on_current_empty = v,
            ConfigCommand::SetLandingOnLastWorkspaceEmpty(v) => {
                self.landing.on_last_workspace_empty = v
            }
            ConfigCommand::SetLandingOnStartup(v) => self.landing.on_startup = v,
        }
    }

    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        let value = match key {
            "settings.on_current_workspace_empty" => {
                self.settings.on_current_workspace_empty.to_string()
            }
            "settings.on_last_workspace_empty" => self.settings.on_last_workspace_empty.to_string(),
            "settings.on_startup" => self.settings.on_startup.to_string(),
            "settings.ignore_minimized_windows" => self.settings.ignore_minimized_windows.to_string(),
            "settings.ignore_secondary_monitor_windows" => {
                self.settings.ignore_secondary_monitor_windows.to_string()
            }
            "settings.startup_retry_delay_ms" => self.settings.startup_retry_delay_ms.to_string(),
            "landing.on_current_empty" => self.landing.on_current_empty.to_string(),
            "landing.on_last_workspace_empty" => self.landing.on_last_workspace_empty.to_string(),
            "landing.on_startup" => self.landing.on_startup.to_string(),
            _ => bail!("unknown key '{key}'"),
        };
        Ok(value)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_file_matches_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn parses_landing_surfaces() {
        let config = Config::parse(
            r#"
            [settings]
            on_startup = false
            ignore_secondary_monitor_windows = true

            [landing]
            on_current_empty = "applications"
            on_last_workspace_empty = "frequent"
            "#,
        )
        .unwrap();

        assert!(!config.settings.on_startup);
        assert!(config.settings.ignore_secondary_monitor_windows);
        assert!(config.settings.on_current_workspace_empty);
        assert_eq!(config.landing.on_current_empty, LandingSurface::Applications);
        assert_eq!(config.landing.on_last_workspace_empty, LandingSurface::Frequent);
        assert_eq!(config.landing.on_startup, LandingSurface::Overview);
    }

    #[test]
    fn rejects_unknown_fields_and_surfaces() {
        assert!(Config::parse("[settings]\nopen_on_close = true").is_err());
        assert!(Config::parse("[landing]\non_startup = \"dashboard\"").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_empty());

        config.settings.startup_retry_delay_ms = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("at least 1"));

        assert_eq!(config.auto_fix_values(), 1);
        assert_eq!(config.settings.startup_retry_delay_ms, 1000);

        config.settings.startup_retry_delay_ms = 60_000;
        assert_eq!(config.validate().len(), 1);
        assert_eq!(config.auto_fix_values(), 1);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn commands_round_trip_through_get() {
        let mut config = Config::default();
        for (key, value) in [
            ("settings.on_startup", "false"),
            ("settings.ignore_minimized_windows", "on"),
            ("settings.startup_retry_delay_ms", "250"),
            ("landing.on_startup", "frequent"),
            ("landing.on_current_empty", "applications"),
        ] {
            config.apply(ConfigCommand::parse(key, value).unwrap());
        }

        assert_eq!(config.get("settings.on_startup").unwrap(), "false");
        assert_eq!(config.get("settings.ignore_minimized_windows").unwrap(), "true");
        assert_eq!(config.get("settings.startup_retry_delay_ms").unwrap(), "250");
        assert_eq!(config.get("landing.on_startup").unwrap(), "frequent");
        assert_eq!(config.get("landing.on_current_empty").unwrap(), "applications");
        assert_eq!(config.get("landing.on_last_workspace_empty").unwrap(), "overview");
    }

    #[test]
    fn every_key_is_readable() {
        let config = Config::default();
        for key in ConfigCommand::KEYS {
            assert!(config.get(key).is_ok(), "{key} is not readable");
        }
        assert!(config.get("settings.nope").is_err());
    }

    #[test]
    fn parse_rejects_bad_values() {
        assert!(ConfigCommand::parse("settings.on_startup", "maybe").is_err());
        assert!(ConfigCommand::parse("landing.on_startup", "desktop").is_err());
        assert!(ConfigCommand::parse("settings.startup_retry_delay_ms", "-1").is_err());
        assert!(ConfigCommand::parse("landing.somewhere", "overview").is_err());
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.apply(ConfigCommand::SetLandingOnLastWorkspaceEmpty(LandingSurface::Frequent));
        config.apply(ConfigCommand::SetIgnoreSecondaryMonitorWindows(true));
        config.save(&path).unwrap();

        assert_eq!(Config::read(&path).unwrap(), config);
        assert_eq!(
            Config::read_or_default(&dir.path().join("missing.toml")).unwrap(),
            Config::default()
        );
    }
}
