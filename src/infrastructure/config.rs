use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub state: StateSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub default_port: u16,
    /// Samples per provider requested on every poll
    #[serde(default = "default_provider_window")]
    pub provider_window: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateSettings {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            default_port: default_port(),
            provider_window: default_provider_window(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_provider_window() -> u32 {
    100
}

fn default_interval_secs() -> u64 {
    60
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".dashboard-state.json")
}

/// `config/dashboard.{toml,json,...}` if present, overridden by `DASHBOARD_*`
/// environment variables (`DASHBOARD_BACKEND__DEFAULT_PORT=5001`)
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_from("config/dashboard")
}

fn load_from(base: &str) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(base).required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_from("does/not/exist").unwrap();

        assert_eq!(config.backend.host, "localhost");
        assert_eq!(config.backend.default_port, 5000);
        assert_eq!(config.backend.provider_window, 100);
        assert_eq!(config.refresh.interval(), Duration::from_secs(60));
        assert_eq!(config.server.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[backend]\ndefault_port = 5123\n\n[refresh]\ninterval_secs = 15").unwrap();

        let base = dir.path().join("dashboard");
        let config = load_from(base.to_str().unwrap()).unwrap();

        assert_eq!(config.backend.default_port, 5123);
        assert_eq!(config.backend.host, "localhost");
        assert_eq!(config.refresh.interval_secs, 15);
    }
}
