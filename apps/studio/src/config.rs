use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::export::ExportOptions;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is set to an invalid value.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables `/api/v1/enhance` when set.
    pub anthropic_api_key: Option<String>,
    pub export_quality_scale: f32,
    pub export_settle_delay: Duration,
    pub preview_viewport_width_px: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            export_quality_scale: 2.0,
            export_settle_delay: Duration::from_millis(1500),
            preview_viewport_width_px: 900.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => defaults.port,
        };

        let export_quality_scale = match get("EXPORT_QUALITY_SCALE") {
            Some(v) => {
                let scale = v
                    .trim()
                    .parse::<f32>()
                    .context("EXPORT_QUALITY_SCALE must be a number")?;
                if !scale.is_finite() || scale <= 0.0 || scale > 8.0 {
                    bail!("EXPORT_QUALITY_SCALE must be in (0, 8], got {scale}");
                }
                scale
            }
            None => defaults.export_quality_scale,
        };

        let export_settle_delay = match get("EXPORT_SETTLE_DELAY_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse::<u64>()
                    .context("EXPORT_SETTLE_DELAY_MS must be a whole number of milliseconds")?,
            ),
            None => defaults.export_settle_delay,
        };

        let preview_viewport_width_px = match get("PREVIEW_VIEWPORT_WIDTH_PX") {
            Some(v) => {
                let width = v
                    .trim()
                    .parse::<f32>()
                    .context("PREVIEW_VIEWPORT_WIDTH_PX must be a number")?;
                if !width.is_finite() || width <= 0.0 {
                    bail!("PREVIEW_VIEWPORT_WIDTH_PX must be positive, got {width}");
                }
                width
            }
            None => defaults.preview_viewport_width_px,
        };

        Ok(Config {
            port,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            export_quality_scale,
            export_settle_delay,
            preview_viewport_width_px,
        })
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            quality_scale: self.export_quality_scale,
            settle_delay: self.export_settle_delay,
            ..ExportOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.export_quality_scale, 2.0);
        assert_eq!(config.export_settle_delay, Duration::from_millis(1500));
        assert_eq!(config.preview_viewport_width_px, 900.0);
    }

    #[test]
    fn test_values_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("EXPORT_QUALITY_SCALE", "3"),
            ("EXPORT_SETTLE_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        let options = config.export_options();
        assert_eq!(options.quality_scale, 3.0);
        assert!(options.settle_delay.is_zero());
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_invalid_values_fail_startup() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("EXPORT_QUALITY_SCALE", "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[("EXPORT_SETTLE_DELAY_MS", "1.5s")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PREVIEW_VIEWPORT_WIDTH_PX", "0")])).is_err());
    }
}
