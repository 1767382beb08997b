use crate::types::*;
use chrono::{DateTime, Utc};
use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  match env_default("BRACKET_CONFIG_PATH") {
    Some(raw) => resolve_repo_path(&raw),
    None => repo_root().join("config.json"),
  }
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn parse_flag(value: &str) -> bool {
  let value = value.trim().to_ascii_lowercase();
  matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

pub fn apply_env_defaults(config: AppConfig) -> AppConfig {
  apply_overrides(config, env_default)
}

/// Fills blank string settings and overrides numeric/flag settings from
/// `lookup`, which maps a `BRACKET_*` key to its trimmed value.
pub fn apply_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
  F: Fn(&str) -> Option<String>,
{
  if config.log_level.trim().is_empty() {
    config.log_level = DEFAULT_LOG_LEVEL.to_string();
  }
  if let Some(value) = lookup("BRACKET_LOG_LEVEL") {
    config.log_level = value;
  }
  if config.log_dir.trim().is_empty() {
    if let Some(value) = lookup("BRACKET_LOG_DIR") {
      config.log_dir = value;
    }
  }
  if config.default_created_by.trim().is_empty() {
    if let Some(value) = lookup("BRACKET_CREATED_BY") {
      config.default_created_by = value;
    }
  }
  if let Some(value) = lookup("BRACKET_MIN_PARTICIPANTS") {
    match value.parse::<usize>() {
      Ok(min) => config.min_participants = min,
      Err(e) => tracing::warn!("ignoring BRACKET_MIN_PARTICIPANTS={value}: {e}"),
    }
  }
  if let Some(value) = lookup("BRACKET_THIRD_PLACE") {
    config.third_place_match = parse_flag(&value);
  }
  config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, String> {
  if !path.is_file() {
    return Ok(apply_env_defaults(AppConfig::default()));
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<AppConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn now() -> DateTime<Utc> {
  Utc::now()
}

pub fn log_config_warnings(config: &AppConfig) {
  let mut warnings = Vec::new();
  if config.min_participants < DEFAULT_MIN_PARTICIPANTS {
    warnings.push(format!(
      "minParticipants is {}, brackets with fewer than {DEFAULT_MIN_PARTICIPANTS} entrants have no matches",
      config.min_participants
    ));
  }
  if config.third_place_match {
    warnings.push("thirdPlaceMatch is stored on new brackets but no third place match is built".to_string());
  }
  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}
