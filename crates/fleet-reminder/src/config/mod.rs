use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, NaiveTime};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the reminder service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub reminders: ReminderConfig,
    pub rosters: RosterConfig,
    pub mail: MailConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let fire_at_raw = env::var("REMINDER_FIRE_AT").unwrap_or_else(|_| "07:00".to_string());
        let fire_at = NaiveTime::parse_from_str(&fire_at_raw, "%H:%M").map_err(|source| {
            ConfigError::InvalidFireAt {
                value: fire_at_raw.clone(),
                source,
            }
        })?;

        let offset_raw = env::var("REMINDER_UTC_OFFSET").unwrap_or_else(|_| "+00:00".to_string());
        let utc_offset = parse_utc_offset(&offset_raw)
            .ok_or(ConfigError::InvalidUtcOffset { value: offset_raw })?;

        let dispatch_timeout = env::var("REMINDER_DISPATCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidDispatchTimeout)?;

        let licenses = env::var("LICENSE_ROSTER").ok().map(PathBuf::from);
        let insurances = env::var("INSURANCE_ROSTER").ok().map(PathBuf::from);

        let host = env::var("SMTP_HOST").ok().filter(|v| !v.trim().is_empty());
        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidSmtpPort)?;
        let username = env::var("SMTP_USERNAME").ok();
        let password = env::var("SMTP_PASSWORD").ok();
        let sender = env::var("SMTP_SENDER").ok().filter(|v| !v.trim().is_empty());

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            reminders: ReminderConfig {
                fire_at,
                utc_offset,
                dispatch_timeout,
            },
            rosters: RosterConfig {
                licenses,
                insurances,
            },
            mail: MailConfig {
                host,
                port,
                username,
                password,
                sender,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings controlling the daily trigger and dispatch behavior.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub fire_at: NaiveTime,
    pub utc_offset: FixedOffset,
    pub dispatch_timeout: Duration,
}

/// Roster export files backing the record sources in `serve` mode.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub licenses: Option<PathBuf>,
    pub insurances: Option<PathBuf>,
}

/// Outbound SMTP settings. Host and sender stay optional at load time so
/// commands that never send real mail need no SMTP variables; `relay()`
/// validates them wherever a real transport is built.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: Option<String>,
}

impl MailConfig {
    pub fn relay(&self) -> Result<RelaySettings, ConfigError> {
        let host = self
            .host
            .clone()
            .ok_or(ConfigError::MissingVar { name: "SMTP_HOST" })?;
        let sender = self.sender.clone().ok_or(ConfigError::MissingVar {
            name: "SMTP_SENDER",
        })?;
        let credentials = match (self.username.clone(), self.password.clone()) {
            (Some(username), Some(password)) => Some(RelayCredentials { username, password }),
            _ => None,
        };

        Ok(RelaySettings {
            host,
            port: self.port,
            credentials,
            sender,
        })
    }
}

/// Validated SMTP relay parameters handed to the production transport.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub credentials: Option<RelayCredentials>,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct RelayCredentials {
    pub username: String,
    pub password: String,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let trimmed = value.trim();
    let negative = match trimmed.chars().next()? {
        '+' => false,
        '-' => true,
        _ => return None,
    };

    let (hours, minutes) = trimmed[1..].split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }

    let mut seconds = hours * 3600 + minutes * 60;
    if negative {
        seconds = -seconds;
    }
    FixedOffset::east_opt(seconds)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFireAt {
        value: String,
        source: chrono::ParseError,
    },
    InvalidUtcOffset {
        value: String,
    },
    InvalidDispatchTimeout,
    InvalidSmtpPort,
    MissingVar {
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFireAt { value, .. } => {
                write!(f, "REMINDER_FIRE_AT must be HH:MM, got {value:?}")
            }
            ConfigError::InvalidUtcOffset { value } => {
                write!(f, "REMINDER_UTC_OFFSET must be +HH:MM or -HH:MM, got {value:?}")
            }
            ConfigError::InvalidDispatchTimeout => {
                write!(f, "REMINDER_DISPATCH_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::MissingVar { name } => write!(f, "{name} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidFireAt { source, .. } => Some(source),
            ConfigError::InvalidUtcOffset { .. }
            | ConfigError::InvalidDispatchTimeout
            | ConfigError::InvalidSmtpPort
            | ConfigError::MissingVar { .. } => None,
        }
    }
}
