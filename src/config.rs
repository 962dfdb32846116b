use anyhow::{Context, Result};
use reqwest::Url;
use std::{env, net::IpAddr, path::PathBuf, time::Duration};

/// Application configuration loaded and validated at startup
///
/// Every binary loads it once and hands the parts to the components that
/// need them.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Mock device server configuration
    pub mock_server: MockServerConfig,

    /// Device client configuration
    pub device: DeviceConfig,
}

#[derive(Clone, Debug)]
pub struct MockServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Directory with web UI assets served for unmatched paths
    pub static_dir: Option<PathBuf>,
    /// Upstream receiving requests the mock does not emulate
    pub passthrough_url: Option<Url>,
}

#[derive(Clone, Debug)]
pub struct DeviceConfig {
    pub url: Url,
    /// Request timeout, the transport default applies when unset
    pub timeout: Option<Duration>,
}

impl AppConfig {
    /// Load all configuration from environment variables
    pub fn load() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load all configuration through `var`, which resolves a variable name
    /// to its value
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            mock_server: MockServerConfig::load(&var)?,
            device: DeviceConfig::load(&var)?,
        })
    }
}

impl MockServerConfig {
    fn load(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_address = var("MOCK_BIND_ADDRESS")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .context("failed to parse MOCK_BIND_ADDRESS: invalid format")?;

        let port = var("MOCK_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("failed to parse MOCK_PORT: invalid format")?;

        let static_dir = var("MOCK_STATIC_DIR").map(PathBuf::from);

        let passthrough_url = var("MOCK_PASSTHROUGH_URL")
            .map(|url| Url::parse(&url))
            .transpose()
            .context("failed to parse MOCK_PASSTHROUGH_URL: invalid url")?;

        Ok(Self {
            bind_address,
            port,
            static_dir,
            passthrough_url,
        })
    }
}

impl DeviceConfig {
    // address of the device's own access point
    const DEFAULT_URL: &str = "http://192.168.4.1";

    fn load(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = Url::parse(&var("DEVICE_URL").unwrap_or_else(|| Self::DEFAULT_URL.to_string()))
            .context("failed to parse DEVICE_URL: invalid url")?;

        let timeout = var("DEVICE_TIMEOUT_SECS")
            .map(|secs| secs.parse::<u64>())
            .transpose()
            .context("failed to parse DEVICE_TIMEOUT_SECS: invalid format")?
            .map(Duration::from_secs);

        Ok(Self { url, timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = load(&[]).unwrap();

        assert_eq!(
            config.mock_server.bind_address,
            "127.0.0.1".parse::<IpAddr>().unwrap()
        );
        assert_eq!(config.mock_server.port, 8080);
        assert!(config.mock_server.static_dir.is_none());
        assert!(config.mock_server.passthrough_url.is_none());
        assert_eq!(config.device.url.as_str(), "http://192.168.4.1/");
        assert!(config.device.timeout.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            ("MOCK_BIND_ADDRESS", "0.0.0.0"),
            ("MOCK_PORT", "3000"),
            ("MOCK_STATIC_DIR", "webui/dist"),
            ("MOCK_PASSTHROUGH_URL", "http://localhost:5173"),
            ("DEVICE_URL", "http://10.0.0.17"),
            ("DEVICE_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.mock_server.port, 3000);
        assert_eq!(
            config.mock_server.static_dir,
            Some(PathBuf::from("webui/dist"))
        );
        assert_eq!(
            config.mock_server.passthrough_url.unwrap().as_str(),
            "http://localhost:5173/"
        );
        assert_eq!(config.device.url.as_str(), "http://10.0.0.17/");
        assert_eq!(config.device.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_invalid_port() {
        let error = load(&[("MOCK_PORT", "70000")]).unwrap_err();
        assert!(error.to_string().contains("MOCK_PORT"));
    }

    #[test]
    fn rejects_invalid_device_url() {
        let error = load(&[("DEVICE_URL", "192.168.4.1")]).unwrap_err();
        assert!(error.to_string().contains("DEVICE_URL"));
    }

    #[test]
    fn rejects_invalid_timeout() {
        let error = load(&[("DEVICE_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(error.to_string().contains("DEVICE_TIMEOUT_SECS"));
    }
}
