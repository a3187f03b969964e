//! Config loader — reads `~/.winbot/windows.json`, merges env vars, and
//! applies legacy migrations.
//!
//! Only a missing file falls back to defaults; a broken one is reported.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.winbot/windows.json`
//! 3. Environment variables `WINBOT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;
use crate::error::WindowError;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("windows.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// A missing file yields `Config::default()`. A file that exists but can't be
/// read, parsed or deserialized is a `WindowError::Config`.
pub fn load_config(path: Option<&Path>) -> Result<Config, WindowError> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Result<Config, WindowError> {
    if !path.exists() {
        info!("No window catalog found at {}, using defaults", path.display());
        return Ok(apply_env_overrides(Config::default()));
    }

    debug!("Loading window catalog from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        warn!("Failed to read config file {}: {}", path.display(), e);
        WindowError::Config(format!("can't read {}: {e}", path.display()))
    })?;

    // Parse JSON → Value first for migration
    let mut raw: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        warn!("Failed to parse config JSON: {}", e);
        WindowError::Config(format!("{} is not valid JSON: {e}", path.display()))
    })?;

    migrate_config(&mut raw);

    let config: Config = serde_json::from_value(raw).map_err(|e| {
        warn!("Failed to deserialize config: {}", e);
        WindowError::Config(format!("{}: {e}", path.display()))
    })?;

    Ok(apply_env_overrides(config))
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves window-level `sizes` / `repeat` into `layout.rowSizes` /
/// `layout.repeat`, unless the window already has a `layout`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(windows) = raw.get_mut("windows").and_then(|w| w.as_array_mut()) else {
        return;
    };

    for window in windows {
        let Some(obj) = window.as_object_mut() else {
            continue;
        };
        if obj.contains_key("layout") {
            continue;
        }
        let Some(sizes) = obj.remove("sizes") else {
            continue;
        };
        let repeat = obj
            .remove("repeat")
            .unwrap_or(serde_json::Value::Bool(false));
        obj.insert(
            "layout".to_string(),
            serde_json::json!({ "rowSizes": sizes, "repeat": repeat }),
        );
        debug!("Migrated window-level sizes/repeat → layout");
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `WINBOT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `WINBOT_TELEGRAM__TOKEN` → `telegram.token`
/// - `WINBOT_TELEGRAM__DEFAULT_CHAT_ID` → `telegram.default_chat_id`
/// - `WINBOT_DEFAULTS__REPEAT` → `defaults.repeat`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("WINBOT_TELEGRAM__TOKEN") {
        config.telegram.token = val;
    }
    if let Ok(val) = std::env::var("WINBOT_TELEGRAM__DEFAULT_CHAT_ID") {
        config.telegram.default_chat_id = Some(val);
    }
    if let Ok(val) = std::env::var("WINBOT_DEFAULTS__REPEAT") {
        config.defaults.repeat = val == "true" || val == "1";
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Button;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/windows.json")).unwrap();
        assert!(config.windows.is_empty());
        assert_eq!(config.defaults.row_sizes, vec![1]);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "windows": [
                {
                    "name": "hello",
                    "text": "Hello {username}",
                    "buttons": [
                        { "kind": "inline", "text": "hello {username}", "payload": "call:{but}" }
                    ]
                }
            ]
        }"#,
        );

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.windows.len(), 1);
        assert_eq!(
            config.windows[0].buttons[0],
            Button::inline("hello {username}", "call:{but}")
        );
    }

    #[test]
    fn test_load_invalid_json_is_an_error() {
        let file = write_temp_json("not valid json {{{");
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, WindowError::Config(_)));
    }

    #[test]
    fn test_one_bad_window_fails_the_whole_load() {
        let file = write_temp_json(
            r#"{ "windows": [
                { "name": "good", "text": "hi" },
                { "name": "bad", "layout": { "rowSizes": [0] } }
            ] }"#,
        );
        let err = load_config_from_path(file.path()).unwrap_err();
        let WindowError::Config(message) = err else {
            panic!("expected a config error, got {err:?}");
        };
        assert!(message.contains("zero"), "unexpected message: {message}");
    }

    #[test]
    fn test_public_load_surfaces_errors() {
        let file = write_temp_json(r#"{ "windows": "not a list" }"#);
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windows.json");

        let mut config = Config::default();
        config.defaults.row_sizes = vec![2, 2];
        config.windows.push(super::super::schema::WindowSpec {
            name: "start".into(),
            text: Some("Welcome".into()),
            buttons: vec![Button::reply("Go")],
            ..Default::default()
        });

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path).unwrap();
        assert_eq!(reloaded.defaults.row_sizes, vec![2, 2]);
        assert_eq!(reloaded.windows[0].name, "start");
        assert_eq!(reloaded.windows[0].buttons, vec![Button::reply("Go")]);
    }

    #[test]
    fn test_migrate_window_sizes() {
        let file = write_temp_json(
            r#"{
            "windows": [
                { "name": "legacy", "sizes": [2, 1], "repeat": true }
            ]
        }"#,
        );

        let config = load_config_from_path(file.path()).unwrap();
        let layout = config.windows[0].layout.as_ref().unwrap();
        assert_eq!(layout.row_sizes(), &[2, 1]);
        assert!(layout.repeat());
    }

    #[test]
    fn test_migrate_no_overwrite() {
        let file = write_temp_json(
            r#"{
            "windows": [
                { "name": "both", "sizes": [5], "layout": { "rowSizes": [3] } }
            ]
        }"#,
        );

        let config = load_config_from_path(file.path()).unwrap();
        let layout = config.windows[0].layout.as_ref().unwrap();
        assert_eq!(layout.row_sizes(), &[3]);
    }

    #[test]
    fn test_env_override_token() {
        std::env::set_var("WINBOT_TELEGRAM__TOKEN", "env-token");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.telegram.token, "env-token");
        std::env::remove_var("WINBOT_TELEGRAM__TOKEN");
    }

    #[test]
    fn test_env_override_default_chat() {
        std::env::set_var("WINBOT_TELEGRAM__DEFAULT_CHAT_ID", "-100123");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.telegram.default_chat_id.as_deref(), Some("-100123"));
        std::env::remove_var("WINBOT_TELEGRAM__DEFAULT_CHAT_ID");
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windows.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["defaults"].get("rowSizes").is_some());
        assert!(raw["defaults"].get("row_sizes").is_none());
    }
}
