//! Config command implementation.
//!
//! Generates sample configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{Config, InstanceConfig, MetricConfig, TagConfig};

/// Generates a sample configuration file.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = sample_config();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("snmp-poller.yaml"),
    };

    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Toml => toml::to_string(&config)?,
        ConfigFormat::Yaml => {
            let mut content = serde_yaml::to_string(&config)?;
            if commented {
                content = add_config_comments(content);
            }
            content
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// A working starting point: one device, the three metric shapes.
fn sample_config() -> Config {
    Config {
        init_config: Default::default(),
        instances: vec![InstanceConfig {
            ip_address: Some("192.168.34.10".into()),
            port: Some(161),
            community_string: Some("public".into()),
            metrics: vec![
                MetricConfig {
                    mib: Some("IF-MIB".into()),
                    table: Some("ifTable".into()),
                    symbols: Some(vec!["ifInOctets".into(), "ifOutOctets".into()]),
                    metric_tags: vec![TagConfig {
                        tag: "interface".into(),
                        column: Some("ifDescr".into()),
                        index: None,
                    }],
                    ..Default::default()
                },
                MetricConfig {
                    mib: Some("TCP-MIB".into()),
                    symbol: Some("tcpCurrEstab".into()),
                    ..Default::default()
                },
                MetricConfig {
                    oid: Some("1.3.6.1.2.1.1.3.0".into()),
                    name: Some("uptime".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }],
    }
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# SNMP Poller Configuration
# =========================
#
# init_config
# -----------
# mibs_folder: /etc/snmp-poller/mibs  # Extra MIB symbol tables (TOML)
# min_collection_interval: 15         # Seconds between poll cycles
#
# instances[]
# -----------
# ip_address: 192.168.34.10           # Required
# port: 161                           # Default 161
# community_string: public            # SNMP v1/v2c
# user: monitor                       # ... or SNMPv3 (with authKey/privKey,
#                                     #     authProtocol/privProtocol)
# timeout: 1                          # Seconds per request attempt
# retries: 5
# tags: ["env:prod"]
#
# metrics[] — exactly one shape each:
#   - MIB + table + symbols (+ metric_tags with column or index entries)
#   - MIB + symbol (scalar)
#   - OID (+ optional name)

"#;
    format!("{}{}", comments, yaml)
}
