use crate::storage::sheet::DEFAULT_API_BASE;
use crate::storage::SheetConfig;
use chrono::NaiveDate;
use std::{env, path::PathBuf};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set when STORAGE_BACKEND=sheet")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Session,
    File(PathBuf),
    Sheet(SheetConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingDefaults {
    pub current: i64,
    pub target: i64,
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub backend: Backend,
    pub history_enabled: bool,
    pub pacing: PacingDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", 8080)?;
        let history_enabled = match lookup("HISTORY_ENABLED") {
            None => true,
            Some(value) => parse_flag("HISTORY_ENABLED", &value)?,
        };

        let backend = match lookup("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("file") => Backend::File(resolve_data_dir(&lookup)),
            Some("none") | Some("session") => Backend::Session,
            Some("sheet") => Backend::Sheet(SheetConfig {
                api_base: lookup("SHEETS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                spreadsheet_id: lookup("SHEETS_SPREADSHEET_ID")
                    .ok_or(ConfigError::Missing("SHEETS_SPREADSHEET_ID"))?,
                access_token: lookup("SHEETS_ACCESS_TOKEN")
                    .ok_or(ConfigError::Missing("SHEETS_ACCESS_TOKEN"))?,
            }),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let pacing = PacingDefaults {
            current: parse_amount(&lookup, "PACING_CURRENT", 1000)?,
            target: parse_amount(&lookup, "PACING_TARGET", 2000)?,
            target_date: parse_or(
                &lookup,
                "PACING_TARGET_DATE",
                NaiveDate::from_ymd_opt(2026, 4, 30).unwrap_or_default(),
            )?,
        };

        Ok(Self {
            port,
            backend,
            history_enabled,
            pacing,
        })
    }
}

fn resolve_data_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("APP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_amount<F>(lookup: &F, name: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount = parse_or(lookup, name, default)?;
    if amount < 0 {
        return Err(ConfigError::Invalid {
            name,
            value: amount.to_string(),
        });
    }
    Ok(amount)
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_use_file_backend() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, Backend::File(PathBuf::from("data")));
        assert!(config.history_enabled);
        assert_eq!(config.pacing.current, 1000);
        assert_eq!(config.pacing.target, 2000);
        assert_eq!(config.pacing.target_date.to_string(), "2026-04-30");
    }

    #[test]
    fn sheet_backend_requires_credentials() {
        assert_eq!(
            config(&[("STORAGE_BACKEND", "sheet"), ("SHEETS_SPREADSHEET_ID", "abc")]).unwrap_err(),
            ConfigError::Missing("SHEETS_ACCESS_TOKEN")
        );

        let config = config(&[
            ("STORAGE_BACKEND", "sheet"),
            ("SHEETS_SPREADSHEET_ID", "abc"),
            ("SHEETS_ACCESS_TOKEN", "token"),
        ])
        .unwrap();
        match config.backend {
            Backend::Sheet(sheet) => {
                assert_eq!(sheet.api_base, DEFAULT_API_BASE);
                assert_eq!(sheet.spreadsheet_id, "abc");
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn invalid_values_are_reported() {
        assert_eq!(
            config(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".into()
            }
        );
        assert!(config(&[("STORAGE_BACKEND", "postgres")]).is_err());
        assert!(config(&[("HISTORY_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn negative_pacing_amounts_are_rejected() {
        assert_eq!(
            config(&[("PACING_CURRENT", "-1")]).unwrap_err(),
            ConfigError::Invalid {
                name: "PACING_CURRENT",
                value: "-1".into()
            }
        );
        assert!(config(&[("PACING_TARGET", "-2000")]).is_err());
    }

    #[test]
    fn session_backend_and_history_toggle() {
        let config = config(&[("STORAGE_BACKEND", "none"), ("HISTORY_ENABLED", "off")]).unwrap();
        assert_eq!(config.backend, Backend::Session);
        assert!(!config.history_enabled);
    }
}
