// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the rate gate and the registry client.
//!
//! Defaults match the registry's published quota of 10 document submissions
//! per minute.

use crate::error::{ConfigError, GateError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rate gate configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Registry endpoint configuration
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Unit of time whose length is one rate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit.
    pub fn duration(self) -> Duration {
        match self {
            Self::Milliseconds => Duration::from_millis(1),
            Self::Seconds => Duration::from_secs(1),
            Self::Minutes => Duration::from_secs(60),
            Self::Hours => Duration::from_secs(60 * 60),
            Self::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "sec" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            _ => Err(ConfigError::UnknownTimeUnit(s.to_string())),
        }
    }
}

/// Rate gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length when `window_secs` is unset (default: minutes)
    #[serde(default = "default_time_unit")]
    pub time_unit: TimeUnit,

    /// Maximum requests per window (default: 10)
    #[serde(default = "default_request_limit")]
    pub request_limit: u32,

    /// Explicit window length in seconds, overriding `time_unit`
    #[serde(default)]
    pub window_secs: Option<u64>,
}

/// Registry endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Document creation endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_time_unit() -> TimeUnit {
    TimeUnit::Minutes
}

fn default_request_limit() -> u32 {
    10
}

fn default_endpoint() -> String {
    "https://ismp.crpt.ru/api/v3/lk/documents/create".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            time_unit: default_time_unit(),
            request_limit: default_request_limit(),
            window_secs: None,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RateLimitConfig {
    /// Limit of `request_limit` requests per one `time_unit`.
    pub fn per(time_unit: TimeUnit, request_limit: u32) -> Self {
        Self {
            time_unit,
            request_limit,
            window_secs: None,
        }
    }

    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        match self.window_secs {
            Some(secs) => Duration::from_secs(secs),
            None => self.time_unit.duration(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_limit == 0 {
            return Err(GateError::ZeroLimit.into());
        }
        let window = self.window_duration();
        if window.is_zero() {
            return Err(GateError::ZeroWindow.into());
        }
        if Instant::now().checked_add(window).is_none() {
            return Err(GateError::WindowTooLong.into());
        }
        Ok(())
    }
}

impl RegistryConfig {
    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `TIME_UNIT`: window unit (default: minutes)
    /// - `REQUEST_LIMIT`: requests per window (default: 10)
    /// - `WINDOW_SECS`: explicit window length, overrides `TIME_UNIT`
    /// - `REGISTRY_ENDPOINT`: document creation URL
    /// - `REGISTRY_TIMEOUT_MS`: request timeout (default: 30000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(unit) = lookup("TIME_UNIT") {
            config.rate_limit.time_unit = unit.parse()?;
        }
        if let Some(limit) = lookup("REQUEST_LIMIT") {
            config.rate_limit.request_limit = parse_value("REQUEST_LIMIT", limit)?;
        }
        if let Some(window) = lookup("WINDOW_SECS") {
            config.rate_limit.window_secs = Some(parse_value("WINDOW_SECS", window)?);
        }
        if let Some(endpoint) = lookup("REGISTRY_ENDPOINT") {
            config.registry.endpoint = endpoint;
        }
        if let Some(timeout) = lookup("REGISTRY_TIMEOUT_MS") {
            config.registry.timeout_ms = parse_value("REGISTRY_TIMEOUT_MS", timeout)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit.validate()?;
        if self.registry.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REGISTRY_TIMEOUT_MS",
                value: self.registry.timeout_ms.to_string(),
            });
        }
        if url::Url::parse(&self.registry.endpoint).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "REGISTRY_ENDPOINT",
                value: self.registry.endpoint.clone(),
            });
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
