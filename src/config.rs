use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::models::schedule::WorkingWindow;

const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
const DEFAULT_WORK_START_HOUR: u32 = 9;
const DEFAULT_WORK_END_HOUR: u32 = 18;

/// Flat KEY=VALUE config file, shell-style: `#` comments, optional
/// `export ` prefixes, optional single or double quotes around values.
/// Every lookup should fall back to the process environment (see main.rs).
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
            };
            values.insert(key.trim().to_string(), unquote(value.trim()));
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn unquote(value: &str) -> String {
    if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
    {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

/// Validated scheduling knobs: calendar timezone and daily working hours.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub timezone: Tz,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
}

impl SchedulerSettings {
    /// Build from a config/env lookup closure, applying defaults for
    /// anything unset. Hours are whole local hours, end exclusive.
    pub fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, String> {
        let timezone_name =
            get("CALENDAR_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = Tz::from_str(&timezone_name)
            .map_err(|_| format!("Unknown CALENDAR_TIMEZONE: {}", timezone_name))?;

        let work_start_hour = parse_hour(get("WORK_START_HOUR"), DEFAULT_WORK_START_HOUR)?;
        let work_end_hour = parse_hour(get("WORK_END_HOUR"), DEFAULT_WORK_END_HOUR)?;
        if work_start_hour >= work_end_hour {
            return Err(format!(
                "WORK_START_HOUR ({}) must be before WORK_END_HOUR ({})",
                work_start_hour, work_end_hour
            ));
        }

        Ok(Self {
            timezone,
            work_start_hour,
            work_end_hour,
        })
    }

    pub fn working_window(&self) -> WorkingWindow {
        WorkingWindow {
            tz: self.timezone,
            start_hour: self.work_start_hour,
            end_hour: self.work_end_hour,
        }
    }
}

fn parse_hour(value: Option<String>, default: u32) -> Result<u32, String> {
    let Some(raw) = value else {
        return Ok(default);
    };
    let hour: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Invalid working hour: {}", raw))?;
    if hour > 23 {
        return Err(format!("Working hour out of range: {}", hour));
    }
    Ok(hour)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_when_unset() {
        let settings = SchedulerSettings::from_lookup(&|_| None).unwrap();
        assert_eq!(settings.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(settings.work_start_hour, 9);
        assert_eq!(settings.work_end_hour, 18);
    }

    #[test]
    fn settings_reject_inverted_hours() {
        let lookup = |key: &str| match key {
            "WORK_START_HOUR" => Some("17".to_string()),
            "WORK_END_HOUR" => Some("9".to_string()),
            _ => None,
        };
        assert!(SchedulerSettings::from_lookup(&lookup).is_err());
    }

    #[test]
    fn settings_reject_unknown_timezone() {
        let lookup = |key: &str| match key {
            "CALENDAR_TIMEZONE" => Some("Mars/Olympus_Mons".to_string()),
            _ => None,
        };
        assert!(SchedulerSettings::from_lookup(&lookup).is_err());
    }
}
