use crate::utils::error::{ReporterError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub const PLUGIN_NAME: &str = "influxdb2";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Load-test configuration as far as this reporter cares: only the `plugins` table is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReporterConfig {
    #[serde(default)]
    pub plugins: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxPluginConfig {
    pub influx: InfluxConfig,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Connection settings for a single InfluxDB 1.x host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub path: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub retention_policy: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            protocol: "http".to_string(),
            path: String::new(),
            database: String::new(),
            username: "root".to_string(),
            password: "root".to_string(),
            retention_policy: None,
            timeout_ms: None,
        }
    }
}

impl InfluxConfig {
    /// 組合 InfluxDB 基礎 URL (不含 /write)
    pub fn base_url(&self) -> String {
        let path = self.path.trim_end_matches('/');
        let path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}://{}:{}{}", self.protocol, self.host, self.port, path)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

impl Validate for InfluxConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_one_of("influx.protocol", &self.protocol, &["http", "https"])?;
        validation::validate_non_empty_string("influx.host", &self.host)?;
        validation::validate_range("influx.port", self.port, 1, u16::MAX)?;
        validation::validate_url("influx.host", &self.base_url())?;
        validation::validate_non_empty_string("influx.database", &self.database)?;
        if let Some(timeout) = self.timeout_ms {
            validation::validate_positive_number("influx.timeout_ms", timeout, 1)?;
        }
        Ok(())
    }
}

impl ReporterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReporterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReporterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INFLUX_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReporterError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn has_plugin(&self) -> bool {
        self.plugins.contains_key(PLUGIN_NAME)
    }

    /// The `plugins.influxdb2` section, or `MissingConfigError` when absent.
    pub fn plugin(&self) -> Result<InfluxPluginConfig> {
        let field = format!("plugins.{}", PLUGIN_NAME);
        let section = self.plugins.get(PLUGIN_NAME).cloned();
        let section = validation::validate_required_field(&field, &section)?;

        let plugin: InfluxPluginConfig =
            section
                .clone()
                .try_into()
                .map_err(|e: toml::de::Error| ReporterError::ConfigValidationError {
                    field,
                    message: e.to_string(),
                })?;
        Ok(plugin)
    }

    pub fn validate_config(&self) -> Result<()> {
        let plugin = self.plugin()?;
        plugin.influx.validate()?;
        for key in plugin.tags.keys() {
            validation::validate_non_empty_string("influxdb2.tags", key)?;
        }
        Ok(())
    }
}

impl Validate for ReporterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
