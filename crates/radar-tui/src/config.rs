//! Configuration for the radar terminal dashboard.
//!
//! Loaded from `radar.toml` or `RADAR__` environment variables
//! (e.g. `RADAR__API__BASE_URL`).

use serde::Deserialize;

use radar_api::ApiConfig;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TuiConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Interface tuning.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Interface tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// UI tick interval in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Rows shown in the dashboard recent-scans table.
    #[serde(default = "default_recent_rows")]
    pub recent_rows: usize,

    /// Ticks between automatic re-fetches while a scan is pending/running.
    #[serde(default = "default_refresh_ticks")]
    pub active_scan_refresh_ticks: u64,
}

fn default_tick_ms() -> u64 {
    200
}

fn default_recent_rows() -> usize {
    5
}

fn default_refresh_ticks() -> u64 {
    25
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            recent_rows: default_recent_rows(),
            active_scan_refresh_ticks: default_refresh_ticks(),
        }
    }
}

/// Load configuration from `{file_prefix}.toml` and the environment.
pub fn load(file_prefix: &str) -> anyhow::Result<TuiConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("RADAR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.try_deserialize::<TuiConfig>() {
        Ok(c) => Ok(c),
        Err(_) => Ok(TuiConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TuiConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.tick_ms, 200);
        assert_eq!(config.ui.recent_rows, 5);
        assert_eq!(config.ui.active_scan_refresh_ticks, 25);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "[api]\nbase_url = \"http://radar.internal:9000\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let parsed: TuiConfig = cfg.try_deserialize().unwrap();
        assert_eq!(parsed.api.base_url, "http://radar.internal:9000");
        assert_eq!(parsed.api.timeout_secs, 30);
        assert_eq!(parsed.ui.tick_ms, 200);
    }
}
