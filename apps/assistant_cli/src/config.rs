use std::{collections::HashMap, fs, path::Path};

use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

pub const CONFIG_FILE: &str = "assistant.toml";
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub log_filter: String,
    pub display_utc_offset_minutes: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5001".into(),
            log_filter: "warn".into(),
            display_utc_offset_minutes: 0,
        }
    }
}

/// Layered settings plus the problems met while loading them. The log filter
/// is one of the settings, so warnings are held until tracing is installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warnings: Vec<String>,
}

pub fn load_settings() -> LoadedSettings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the toml file, then environment, each overriding the last.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> LoadedSettings {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
                    settings.api_base_url = v.to_string();
                }
                if let Some(v) = file_cfg.get("log_filter").and_then(toml::Value::as_str) {
                    settings.log_filter = v.to_string();
                }
                if let Some(v) = file_cfg.get("display_utc_offset_minutes") {
                    match offset_minutes_from_toml(v) {
                        Some(minutes) => settings.display_utc_offset_minutes = minutes,
                        None => warnings.push(format!(
                            "ignoring display_utc_offset_minutes = {v} in {}",
                            path.display()
                        )),
                    }
                }
            }
            Err(err) => warnings.push(format!(
                "ignoring unreadable config file {}: {err}",
                path.display()
            )),
        }
    }

    if let Some(v) = env("ASSISTANT_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("ASSISTANT_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("APP__DISPLAY_UTC_OFFSET_MINUTES") {
        match v.trim().parse::<i32>() {
            Ok(parsed) => settings.display_utc_offset_minutes = parsed,
            Err(err) => warnings.push(format!(
                "ignoring APP__DISPLAY_UTC_OFFSET_MINUTES={v:?}: {err}"
            )),
        }
    }

    LoadedSettings { settings, warnings }
}

fn offset_minutes_from_toml(value: &toml::Value) -> Option<i32> {
    match value {
        toml::Value::Integer(minutes) => i32::try_from(*minutes).ok(),
        toml::Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().api_base_url;
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

pub fn display_offset(minutes: i32) -> FixedOffset {
    if minutes.abs() > MAX_OFFSET_MINUTES {
        warn!(minutes, "display offset out of range; using UTC");
        return Utc.fix();
    }
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("assistant_cli_{name}_{suffix}.toml"));
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let loaded = load_settings_from(Path::new("/nonexistent/assistant.toml"), |_| None);
        assert_eq!(loaded, LoadedSettings::default());
    }

    #[test]
    fn env_overrides_file() {
        let path = temp_config(
            "env_overrides",
            "api_base_url = \"http://file:5001\"\nlog_filter = \"debug\"\ndisplay_utc_offset_minutes = 330\n",
        );
        let LoadedSettings { settings, warnings } = load_settings_from(&path, |key| match key {
            "APP__API_BASE_URL" => Some("http://env:5001".into()),
            _ => None,
        });
        fs::remove_file(&path).expect("cleanup");

        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(settings.api_base_url, "http://env:5001");
        assert_eq!(settings.log_filter, "debug");
        assert_eq!(settings.display_utc_offset_minutes, 330);
    }

    #[test]
    fn prefixed_env_wins_over_short_name() {
        let settings = load_settings_from(Path::new("/nonexistent/assistant.toml"), |key| {
            match key {
                "ASSISTANT_LOG" => Some("info".into()),
                "APP__LOG_FILTER" => Some("trace".into()),
                "APP__DISPLAY_UTC_OFFSET_MINUTES" => Some("-300".into()),
                _ => None,
            }
        })
        .settings;
        assert_eq!(settings.log_filter, "trace");
        assert_eq!(settings.display_utc_offset_minutes, -300);
    }

    #[test]
    fn malformed_file_is_ignored_with_a_warning() {
        let path = temp_config("malformed", "api_base_url = ");
        let LoadedSettings { settings, warnings } = load_settings_from(&path, |_| None);
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(settings, Settings::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("ignoring unreadable config file"), "{warnings:?}");
        assert!(warnings[0].contains("assistant_cli_malformed_"));
    }

    #[test]
    fn bad_offsets_are_reported_and_skipped() {
        let path = temp_config("bad_offset", "display_utc_offset_minutes = true\n");
        let from_file = load_settings_from(&path, |_| None);
        fs::remove_file(&path).expect("cleanup");
        assert_eq!(from_file.settings.display_utc_offset_minutes, 0);
        assert_eq!(from_file.warnings.len(), 1);

        let from_env = load_settings_from(Path::new("/nonexistent/assistant.toml"), |key| {
            (key == "APP__DISPLAY_UTC_OFFSET_MINUTES").then(|| "+5h".to_string())
        });
        assert_eq!(from_env.settings.display_utc_offset_minutes, 0);
        assert!(from_env.warnings[0].contains("APP__DISPLAY_UTC_OFFSET_MINUTES"));
    }

    #[test]
    fn normalizes_base_urls() {
        assert_eq!(
            normalize_base_url(" http://20.197.36.75:5001/ "),
            "http://20.197.36.75:5001"
        );
        assert_eq!(normalize_base_url("localhost:5001"), "http://localhost:5001");
        assert_eq!(normalize_base_url(""), Settings::default().api_base_url);
    }

    #[test]
    fn display_offset_falls_back_to_utc() {
        assert_eq!(display_offset(330).local_minus_utc(), 330 * 60);
        assert_eq!(display_offset(20 * 60).local_minus_utc(), 0);
    }
}
