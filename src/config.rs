//! Configuration management for snmp-poller.
//!
//! This module handles loading and validating configuration from files.
//! It supports YAML, JSON, and TOML formats. Raw file contents deserialize
//! into permissive `*Config` structs; `validate_config` turns those into the
//! typed instances the poller runs with.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// Default configuration constants
pub const DEFAULT_PORT: u16 = 161;
pub const DEFAULT_TIMEOUT_SECS: u64 = 1;
pub const DEFAULT_RETRIES: u32 = 5;
pub const DEFAULT_COLLECTION_INTERVAL_SECS: u64 = 15;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("instance {index}: no ip_address configured")]
    MissingIpAddress { index: usize },

    #[error("instance {ip}: no authentication method configured")]
    MissingAuth { ip: String },

    #[error("instance {ip}: unknown authProtocol '{name}'")]
    UnknownAuthProtocol { ip: String, name: String },

    #[error("instance {ip}: unknown privProtocol '{name}'")]
    UnknownPrivProtocol { ip: String, name: String },
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub init_config: InitConfig,
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

/// Shared settings applying to every instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitConfig {
    /// Folder with additional MIB symbol tables (TOML, base table schema).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mibs_folder: Option<PathBuf>,
    /// Seconds between poll cycles when running as a daemon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_collection_interval: Option<u64>,
}

impl InitConfig {
    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(
            self.min_collection_interval
                .unwrap_or(DEFAULT_COLLECTION_INTERVAL_SECS),
        )
    }
}

/// One device entry as written in the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// SNMP v1/v2c authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_string: Option<String>,

    /// SNMPv3 USM authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "authKey", skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(rename = "privKey", skip_serializing_if = "Option::is_none")]
    pub priv_key: Option<String>,
    #[serde(rename = "authProtocol", skip_serializing_if = "Option::is_none")]
    pub auth_protocol: Option<String>,
    #[serde(rename = "privProtocol", skip_serializing_if = "Option::is_none")]
    pub priv_protocol: Option<String>,

    /// Seconds per request attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

/// One metric entry as written in the configuration file. Exactly one of
/// the three shapes (MIB table, MIB symbol, raw OID) must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricConfig {
    #[serde(rename = "MIB", skip_serializing_if = "Option::is_none")]
    pub mib: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(rename = "OID", skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_tags: Vec<TagConfig>,
}

/// One metric_tags entry: either a sibling column or a row-index position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagConfig {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// 1-based position into the row index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// SNMPv3 authentication digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProtocol {
    Md5,
    Sha,
}

impl AuthProtocol {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "usmHMACMD5AuthProtocol" | "MD5" => Some(AuthProtocol::Md5),
            "usmHMACSHAAuthProtocol" | "SHA" => Some(AuthProtocol::Sha),
            _ => None,
        }
    }
}

/// SNMPv3 privacy cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivProtocol {
    Des,
    Aes,
}

impl PrivProtocol {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "usmDESPrivProtocol" | "DES" => Some(PrivProtocol::Des),
            "usmAesCfb128Protocol" | "AES" => Some(PrivProtocol::Aes),
            _ => None,
        }
    }
}

/// Validated authentication settings for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// SNMP v1/v2c community string.
    Community(String),
    /// SNMPv3 user security model.
    Usm {
        user: String,
        auth: Option<(AuthProtocol, String)>,
        privacy: Option<(PrivProtocol, String)>,
    },
}

/// Validated metric request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSpec {
    Table {
        mib: String,
        table: String,
        symbols: Vec<String>,
        tags: Vec<TagSpec>,
    },
    Symbol {
        mib: String,
        symbol: String,
    },
    RawOid {
        oid: String,
        name: Option<String>,
    },
    /// Entry matching none of the shapes; carries the raw text for the
    /// planner's diagnostics.
    Unrecognized { raw: String },
}

/// Validated metric_tags entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSpec {
    Index { key: String, position: usize },
    Column { key: String, column: String },
}

/// One fully validated polling target.
#[derive(Debug, Clone)]
pub struct Instance {
    pub ip_address: String,
    pub port: u16,
    pub auth: Auth,
    pub timeout: Duration,
    pub retries: u32,
    pub tags: Vec<String>,
    pub metrics: Vec<MetricSpec>,
}

impl Instance {
    /// `host:port` endpoint string for the transport layer.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip_address, self.port)
    }

    /// The device tag carried by every sample and service check.
    pub fn device_tag(&self) -> String {
        format!("snmp_device:{}", self.ip_address)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ip_address)
    }
}

/// Validation outcome: instances that loaded plus per-instance failures.
/// A failed instance never stops the others from running.
#[derive(Debug, Default)]
pub struct ValidatedConfig {
    pub instances: Vec<Instance>,
    pub errors: Vec<ConfigError>,
}

/// Validates every configured instance (used by `config --check` and at
/// startup).
pub fn validate_config(config: &Config) -> ValidatedConfig {
    let mut validated = ValidatedConfig::default();
    for (index, raw) in config.instances.iter().enumerate() {
        match validate_instance(index, raw) {
            Ok(instance) => validated.instances.push(instance),
            Err(e) => validated.errors.push(e),
        }
    }
    validated
}

fn validate_instance(index: usize, raw: &InstanceConfig) -> Result<Instance, ConfigError> {
    let ip_address = match &raw.ip_address {
        Some(ip) if !ip.is_empty() => ip.clone(),
        _ => return Err(ConfigError::MissingIpAddress { index }),
    };

    let auth = validate_auth(raw, &ip_address)?;

    Ok(Instance {
        port: raw.port.unwrap_or(DEFAULT_PORT),
        auth,
        timeout: Duration::from_secs(raw.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        retries: raw.retries.unwrap_or(DEFAULT_RETRIES),
        tags: raw.tags.clone(),
        metrics: raw.metrics.iter().map(metric_spec).collect(),
        ip_address,
    })
}

fn validate_auth(raw: &InstanceConfig, ip: &str) -> Result<Auth, ConfigError> {
    if let Some(community) = &raw.community_string {
        return Ok(Auth::Community(community.clone()));
    }

    let user = match &raw.user {
        Some(user) => user.clone(),
        None => return Err(ConfigError::MissingAuth { ip: ip.to_string() }),
    };

    // Keys without a protocol name fall back to the classic USM defaults.
    let auth = match (&raw.auth_key, &raw.auth_protocol) {
        (Some(key), Some(name)) => {
            let protocol =
                AuthProtocol::from_name(name).ok_or_else(|| ConfigError::UnknownAuthProtocol {
                    ip: ip.to_string(),
                    name: name.clone(),
                })?;
            Some((protocol, key.clone()))
        }
        (Some(key), None) => Some((AuthProtocol::Md5, key.clone())),
        (None, Some(name)) => {
            warn!("instance {}: authProtocol '{}' ignored without authKey", ip, name);
            None
        }
        (None, None) => None,
    };

    let privacy = match (&raw.priv_key, &raw.priv_protocol) {
        (Some(key), Some(name)) => {
            let protocol =
                PrivProtocol::from_name(name).ok_or_else(|| ConfigError::UnknownPrivProtocol {
                    ip: ip.to_string(),
                    name: name.clone(),
                })?;
            Some((protocol, key.clone()))
        }
        (Some(key), None) => Some((PrivProtocol::Des, key.clone())),
        (None, Some(name)) => {
            warn!("instance {}: privProtocol '{}' ignored without privKey", ip, name);
            None
        }
        (None, None) => None,
    };

    Ok(Auth::Usm { user, auth, privacy })
}

fn metric_spec(raw: &MetricConfig) -> MetricSpec {
    match (
        raw.mib.as_ref(),
        raw.oid.as_ref(),
        raw.table.as_ref(),
        raw.symbol.as_ref(),
    ) {
        (Some(mib), None, Some(table), None) => match &raw.symbols {
            Some(symbols) => MetricSpec::Table {
                mib: mib.clone(),
                table: table.clone(),
                symbols: symbols.clone(),
                tags: tag_specs(&raw.metric_tags),
            },
            None => unrecognized(raw),
        },
        (Some(mib), None, None, Some(symbol)) => MetricSpec::Symbol {
            mib: mib.clone(),
            symbol: symbol.clone(),
        },
        (None, Some(oid), None, None) => MetricSpec::RawOid {
            oid: oid.clone(),
            name: raw.name.clone(),
        },
        _ => unrecognized(raw),
    }
}

fn unrecognized(raw: &MetricConfig) -> MetricSpec {
    let text = serde_json::to_string(raw).unwrap_or_else(|_| format!("{:?}", raw));
    MetricSpec::Unrecognized { raw: text }
}

fn tag_specs(raw_tags: &[TagConfig]) -> Vec<TagSpec> {
    let mut tags = Vec::new();
    for raw in raw_tags {
        match (&raw.column, raw.index) {
            (Some(column), None) => tags.push(TagSpec::Column {
                key: raw.tag.clone(),
                column: column.clone(),
            }),
            (None, Some(position)) if position >= 1 => tags.push(TagSpec::Index {
                key: raw.tag.clone(),
                position,
            }),
            _ => warn!("ignoring invalid metric tag entry '{}'", raw.tag),
        }
    }
    tags
}

/// Loads configuration from `path`, or from the first default location that
/// exists. Missing files yield the empty default configuration.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        // Try default locations
        let defaults = [
            "/etc/snmp-poller/conf.yaml",
            "/etc/snmp-poller/conf.yml",
            "/etc/snmp-poller/conf.json",
            "./snmp-poller.yaml",
            "./snmp-poller.yml",
            "./snmp-poller.json",
        ];

        match defaults.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        }
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    let parse_err = |reason: String| ConfigError::Parse {
        path: path.clone(),
        reason,
    };

    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config = serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config = toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config = serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance_from_yaml(yaml: &str) -> Result<Instance, ConfigError> {
        let raw: InstanceConfig = serde_yaml::from_str(yaml).unwrap();
        validate_instance(0, &raw)
    }

    #[test]
    fn test_defaults_applied() {
        let instance = instance_from_yaml(
            r#"
            ip_address: 192.168.34.10
            community_string: public
            "#,
        )
        .unwrap();
        assert_eq!(instance.port, 161);
        assert_eq!(instance.timeout, Duration::from_secs(1));
        assert_eq!(instance.retries, 5);
        assert_eq!(instance.auth, Auth::Community("public".into()));
        assert_eq!(instance.endpoint(), "192.168.34.10:161");
        assert_eq!(instance.device_tag(), "snmp_device:192.168.34.10");
    }

    #[test]
    fn test_missing_ip_address() {
        let err = instance_from_yaml("community_string: public").unwrap_err();
        assert!(matches!(err, ConfigError::MissingIpAddress { index: 0 }));
    }

    #[test]
    fn test_missing_auth_method() {
        let err = instance_from_yaml("ip_address: 10.0.0.1").unwrap_err();
        assert!(matches!(err, ConfigError::MissingAuth { .. }));
    }

    #[test]
    fn test_usm_protocol_defaults() {
        let instance = instance_from_yaml(
            r#"
            ip_address: 10.0.0.1
            user: monitor
            authKey: authpass
            privKey: privpass
            "#,
        )
        .unwrap();
        assert_eq!(
            instance.auth,
            Auth::Usm {
                user: "monitor".into(),
                auth: Some((AuthProtocol::Md5, "authpass".into())),
                privacy: Some((PrivProtocol::Des, "privpass".into())),
            }
        );
    }

    #[test]
    fn test_usm_named_protocols() {
        let instance = instance_from_yaml(
            r#"
            ip_address: 10.0.0.1
            user: monitor
            authKey: authpass
            authProtocol: usmHMACSHAAuthProtocol
            privKey: privpass
            privProtocol: AES
            "#,
        )
        .unwrap();
        match instance.auth {
            Auth::Usm { auth, privacy, .. } => {
                assert_eq!(auth.map(|(p, _)| p), Some(AuthProtocol::Sha));
                assert_eq!(privacy.map(|(p, _)| p), Some(PrivProtocol::Aes));
            }
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        let err = instance_from_yaml(
            r#"
            ip_address: 10.0.0.1
            user: monitor
            authKey: authpass
            authProtocol: usmHMACSHA512AuthProtocol
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAuthProtocol { .. }));
    }

    #[test]
    fn test_metric_shapes() {
        let instance = instance_from_yaml(
            r#"
            ip_address: 10.0.0.1
            community_string: public
            metrics:
              - MIB: IF-MIB
                table: ifTable
                symbols: [ifInOctets, ifOutOctets]
                metric_tags:
                  - tag: interface
                    column: ifDescr
                  - tag: slot
                    index: 1
              - MIB: TCP-MIB
                symbol: tcpCurrEstab
              - OID: 1.3.6.1.2.1.2.2.1.10.1
                name: bytes_in
            "#,
        )
        .unwrap();

        assert_eq!(instance.metrics.len(), 3);
        assert_eq!(
            instance.metrics[0],
            MetricSpec::Table {
                mib: "IF-MIB".into(),
                table: "ifTable".into(),
                symbols: vec!["ifInOctets".into(), "ifOutOctets".into()],
                tags: vec![
                    TagSpec::Column {
                        key: "interface".into(),
                        column: "ifDescr".into(),
                    },
                    TagSpec::Index {
                        key: "slot".into(),
                        position: 1,
                    },
                ],
            }
        );
        assert_eq!(
            instance.metrics[1],
            MetricSpec::Symbol {
                mib: "TCP-MIB".into(),
                symbol: "tcpCurrEstab".into(),
            }
        );
        assert_eq!(
            instance.metrics[2],
            MetricSpec::RawOid {
                oid: "1.3.6.1.2.1.2.2.1.10.1".into(),
                name: Some("bytes_in".into()),
            }
        );
    }

    #[test]
    fn test_malformed_metric_becomes_unrecognized() {
        let instance = instance_from_yaml(
            r#"
            ip_address: 10.0.0.1
            community_string: public
            metrics:
              - MIB: IF-MIB
              - MIB: IF-MIB
                table: ifTable
              - OID: 1.3.6.1.2.1.1.3.0
                MIB: IF-MIB
            "#,
        )
        .unwrap();
        for spec in &instance.metrics {
            assert!(matches!(spec, MetricSpec::Unrecognized { .. }));
        }
    }

    #[test]
    fn test_invalid_tag_entries_skipped() {
        let instance = instance_from_yaml(
            r#"
            ip_address: 10.0.0.1
            community_string: public
            metrics:
              - MIB: IF-MIB
                table: ifTable
                symbols: [ifInOctets]
                metric_tags:
                  - tag: broken
                  - tag: zero
                    index: 0
                  - tag: both
                    column: ifDescr
                    index: 1
                  - tag: interface
                    column: ifDescr
            "#,
        )
        .unwrap();
        match &instance.metrics[0] {
            MetricSpec::Table { tags, .. } => {
                assert_eq!(tags.len(), 1);
                assert_eq!(
                    tags[0],
                    TagSpec::Column {
                        key: "interface".into(),
                        column: "ifDescr".into(),
                    }
                );
            }
            other => panic!("unexpected spec: {:?}", other),
        }
    }

    #[test]
    fn test_validate_config_keeps_good_instances() {
        let config: Config = serde_yaml::from_str(
            r#"
            instances:
              - ip_address: 10.0.0.1
                community_string: public
              - community_string: orphan
            "#,
        )
        .unwrap();
        let validated = validate_config(&config);
        assert_eq!(validated.instances.len(), 1);
        assert_eq!(validated.errors.len(), 1);
        assert_eq!(
            validated.errors[0].to_string(),
            "instance 1: no ip_address configured"
        );
    }

    #[test]
    fn test_collection_interval_default() {
        let init = InitConfig::default();
        assert_eq!(init.collection_interval(), Duration::from_secs(15));
        let init = InitConfig {
            min_collection_interval: Some(60),
            ..Default::default()
        };
        assert_eq!(init.collection_interval(), Duration::from_secs(60));
    }
}
