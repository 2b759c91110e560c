//! Agent configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Print agent configuration, env-overridable for service deployments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Printer destination name; the system default printer when unset
    #[serde(default)]
    pub printer: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            printer: None,
        }
    }
}

impl AgentConfig {
    /// Build a configuration from `PRINT_AGENT_*` environment variables,
    /// falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("PRINT_AGENT_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("PRINT_AGENT_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!(
                    value = %port,
                    default = config.port,
                    "PRINT_AGENT_PORT is not a valid port, using default"
                ),
            }
        }
        if let Ok(printer) = std::env::var("PRINT_AGENT_PRINTER") {
            if !printer.is_empty() {
                config.printer = Some(printer);
            }
        }
        config
    }

    /// Socket address string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9310
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_loopback() {
        let config = AgentConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:9310");
        assert!(config.printer.is_none());
    }

    #[test]
    fn malformed_port_env_falls_back_to_default() {
        std::env::set_var("PRINT_AGENT_PORT", "not-a-port");
        let config = AgentConfig::from_env();
        std::env::remove_var("PRINT_AGENT_PORT");
        assert_eq!(config.port, default_port());
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: AgentConfig =
            serde_json::from_str(r#"{ "port": 9000, "printer": "OfficeLaser" }"#).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.printer.as_deref(), Some("OfficeLaser"));
    }
}
