/*!
Bridge configuration

Named-field configuration for the collector endpoint, reporting cadence, and
the gateway's IP binding, loadable from TOML or JSON. The defaults mirror a
typical Raspberry Pi deployment with the collector on the gateway's own
address.
*/

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Collector endpoint receiving topology reports
    pub collector_url: String,

    /// Interval between topology reports
    #[serde(with = "humantime_serde")]
    pub report_interval: Duration,

    /// Upper bound on a single report POST, transport included
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Gateway IP binding
    pub gateway: GatewayConfig,

    /// Logical id of this node on the mesh; 0 runs as master
    pub node_id: u8,
}

/// IP-side binding for the mesh/IP gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub ip: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            collector_url: "http://10.10.2.2/api/gateway".to_string(),
            report_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            gateway: GatewayConfig::default(),
            node_id: 0,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::new(10, 10, 2, 2),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
        }
    }
}

impl BridgeConfig {
    /// Create a new bridge configuration builder
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Load configuration from a TOML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: BridgeConfig = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| BridgeError::config(format!("invalid TOML config: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| BridgeError::config(format!("invalid JSON config: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.collector_url.is_empty() {
            return Err(BridgeError::config("collector URL must not be empty"));
        }

        if !self.collector_url.starts_with("http://") && !self.collector_url.starts_with("https://")
        {
            return Err(BridgeError::config(format!(
                "collector URL must be http(s), got {}",
                self.collector_url
            )));
        }

        if self.report_interval.is_zero() {
            return Err(BridgeError::config("report interval must be non-zero"));
        }

        // u32 millisecond timer arithmetic caps the usable interval
        if self.report_interval.as_millis() > u32::MAX as u128 {
            return Err(BridgeError::config("report interval exceeds timer range"));
        }

        if self.request_timeout.is_zero() {
            return Err(BridgeError::config("request timeout must be non-zero"));
        }

        Ok(())
    }
}

/// Builder for BridgeConfig
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
        }
    }

    pub fn collector_url(mut self, url: &str) -> Self {
        self.config.collector_url = url.to_string();
        self
    }

    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.config.report_interval = interval;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn gateway(mut self, ip: Ipv4Addr, subnet: Ipv4Addr) -> Self {
        self.config.gateway = GatewayConfig { ip, subnet };
        self
    }

    pub fn node_id(mut self, id: u8) -> Self {
        self.config.node_id = id;
        self
    }

    pub fn build(self) -> Result<BridgeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for BridgeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_collector_url_rejected() {
        let mut config = BridgeConfig::default();
        config.collector_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = BridgeConfig::default();
        config.report_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = BridgeConfig::builder()
            .collector_url("http://collector.example.com/api/gateway")
            .report_interval(Duration::from_secs(60))
            .node_id(0)
            .build()
            .unwrap();

        assert_eq!(config.report_interval, Duration::from_secs(60));
        assert_eq!(config.node_id, 0);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BridgeConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: BridgeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.collector_url, config.collector_url);
        assert_eq!(parsed.report_interval, config.report_interval);
    }
}
