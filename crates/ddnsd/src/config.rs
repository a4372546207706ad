//! Configuration loading for ddnsd
//!
//! Values are layered: defaults, then the YAML file (when present), then
//! `DDNS_*` environment variables. The merged result is validated before
//! anything is built from it.

use std::path::Path;

use anyhow::{Context, Result, bail};
use ddns_core::{AddressSourceConfig, DdnsConfig, ProviderConfig};
use tracing::{debug, info};

/// Load, merge and validate the configuration
pub fn load(path: &Path) -> Result<DdnsConfig> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load`], reading variables through `lookup`
pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<DdnsConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: DdnsConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        config
    } else {
        info!(
            "Config file {} not found, using defaults and environment",
            path.display()
        );
        DdnsConfig::new()
    };

    apply_env_overrides(&mut config, lookup)?;
    config.validate().context("Invalid configuration")?;

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Apply `DDNS_*` environment overrides on top of `config`
pub fn apply_env_overrides<F>(config: &mut DdnsConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("DDNS_WAIT_INTERVAL_SECS") {
        config.wait_interval_secs = parse_number("DDNS_WAIT_INTERVAL_SECS", &v)?;
    }
    if let Some(v) = lookup("DDNS_RETRY_INTERVAL_SECS") {
        config.retry_interval_secs = parse_number("DDNS_RETRY_INTERVAL_SECS", &v)?;
    }

    if let Some(v) = lookup("DDNS_METRICS_ENABLE") {
        config.metrics_server.enable = parse_bool("DDNS_METRICS_ENABLE", &v)?;
    }
    if let Some(v) = lookup("DDNS_METRICS_HOST") {
        config.metrics_server.host = v;
    }
    if let Some(v) = lookup("DDNS_METRICS_PORT") {
        config.metrics_server.port = parse_number("DDNS_METRICS_PORT", &v)?;
    }

    apply_address_source_overrides(config, &lookup)?;
    apply_provider_overrides(config, &lookup);

    Ok(())
}

fn apply_address_source_overrides<F>(config: &mut DdnsConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let static_address = lookup("DDNS_STATIC_ADDRESS");
    let url = lookup("DDNS_URL");

    match (static_address, url) {
        (Some(_), Some(_)) => {
            bail!("DDNS_STATIC_ADDRESS and DDNS_URL cannot both be set");
        }
        (Some(address), None) => {
            config.address_source = Some(AddressSourceConfig::Static { address });
        }
        (None, Some(new_url)) => match &mut config.address_source {
            Some(AddressSourceConfig::Url { url, .. }) => *url = new_url,
            _ => {
                config.address_source = Some(AddressSourceConfig::Url {
                    url: new_url,
                    https: true,
                    insecure_skip_verify: false,
                    regex: None,
                    username: None,
                    password: None,
                });
            }
        },
        (None, None) => {}
    }

    const URL_ONLY: [&str; 5] = [
        "DDNS_URL_HTTPS",
        "DDNS_URL_INSECURE",
        "DDNS_URL_REGEX",
        "DDNS_URL_USERNAME",
        "DDNS_URL_PASSWORD",
    ];

    let Some(AddressSourceConfig::Url {
        https,
        insecure_skip_verify,
        regex,
        username,
        password,
        ..
    }) = &mut config.address_source
    else {
        if let Some(key) = URL_ONLY.iter().copied().find(|key| lookup(*key).is_some()) {
            bail!("{} is set but no url address source is configured", key);
        }
        return Ok(());
    };

    if let Some(v) = lookup("DDNS_URL_HTTPS") {
        *https = parse_bool("DDNS_URL_HTTPS", &v)?;
    }
    if let Some(v) = lookup("DDNS_URL_INSECURE") {
        *insecure_skip_verify = parse_bool("DDNS_URL_INSECURE", &v)?;
    }
    if let Some(v) = lookup("DDNS_URL_REGEX") {
        *regex = Some(v).filter(|r| !r.is_empty());
    }
    if let Some(v) = lookup("DDNS_URL_USERNAME") {
        *username = Some(v);
    }
    if let Some(v) = lookup("DDNS_URL_PASSWORD") {
        *password = Some(v);
    }

    Ok(())
}

fn apply_provider_overrides<F>(config: &mut DdnsConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let token = lookup("DDNS_CLOUDFLARE_API_TOKEN");
    let zone = lookup("DDNS_CLOUDFLARE_ZONE_ID");
    let names = lookup("DDNS_CLOUDFLARE_RECORDS");

    if token.is_none() && zone.is_none() && names.is_none() {
        return;
    }

    let ProviderConfig::Cloudflare {
        api_token,
        zone_id,
        records,
    } = config
        .provider
        .get_or_insert_with(|| ProviderConfig::Cloudflare {
            api_token: String::new(),
            zone_id: String::new(),
            records: Vec::new(),
        });

    if let Some(v) = token {
        *api_token = v;
    }
    if let Some(v) = zone {
        *zone_id = v;
    }
    if let Some(v) = names {
        *records = v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer. Got: {}", key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => bail!("{} must be true or false. Got: {}", key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_file_is_loaded() {
        let file = write_config(
            r#"
wait_interval_secs: 120
metrics_server:
  enable: false
address_source:
  type: url
  url: ifconfig.me/ip
  regex: '(\S+)'
provider:
  type: cloudflare
  api_token: token
  zone_id: zone
  records:
    - a.example.com
    - b.example.com
"#,
        );

        let config = load_with_env(file.path(), env(&[])).unwrap();

        assert_eq!(config.wait_interval_secs, 120);
        assert_eq!(config.retry_interval_secs, 5);
        assert!(!config.metrics_server.enable);
        assert_eq!(config.metrics_server.port, 9097);
        match config.address_source {
            Some(AddressSourceConfig::Url {
                ref url,
                https,
                ref regex,
                ..
            }) => {
                assert_eq!(url, "ifconfig.me/ip");
                assert!(https);
                assert_eq!(regex.as_deref(), Some(r"(\S+)"));
            }
            other => panic!("unexpected address source: {:?}", other),
        }
        assert_eq!(
            config.provider.as_ref().map(|p| p.records().len()),
            Some(2)
        );
    }

    #[test]
    fn test_missing_file_uses_defaults_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");

        let config = load_with_env(
            &path,
            env(&[
                ("DDNS_STATIC_ADDRESS", "10.0.0.1"),
                ("DDNS_CLOUDFLARE_API_TOKEN", "token"),
                ("DDNS_CLOUDFLARE_ZONE_ID", "zone"),
                ("DDNS_CLOUDFLARE_RECORDS", "a.example.com, b.example.com,"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.address_source,
            Some(AddressSourceConfig::Static {
                address: "10.0.0.1".to_string()
            })
        );
        assert_eq!(
            config.provider.as_ref().map(|p| p.records().to_vec()),
            Some(vec![
                "a.example.com".to_string(),
                "b.example.com".to_string()
            ])
        );
    }

    #[test]
    fn test_missing_file_without_env_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_with_env(&dir.path().join("absent.yml"), env(&[])).is_err());
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let file = write_config("wait_interval_secs: [not, a, number]\n");
        assert!(load_with_env(file.path(), env(&[])).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = DdnsConfig::new();
        config.address_source = Some(AddressSourceConfig::Url {
            url: "old.example.com/ip".to_string(),
            https: true,
            insecure_skip_verify: false,
            regex: None,
            username: None,
            password: None,
        });

        apply_env_overrides(
            &mut config,
            env(&[
                ("DDNS_WAIT_INTERVAL_SECS", "30"),
                ("DDNS_METRICS_PORT", "9100"),
                ("DDNS_METRICS_ENABLE", "false"),
                ("DDNS_URL", "new.example.com/ip"),
                ("DDNS_URL_HTTPS", "false"),
                ("DDNS_URL_USERNAME", "user"),
                ("DDNS_URL_PASSWORD", "pass"),
            ]),
        )
        .unwrap();

        assert_eq!(config.wait_interval_secs, 30);
        assert_eq!(config.metrics_server.port, 9100);
        assert!(!config.metrics_server.enable);
        assert_eq!(
            config.address_source,
            Some(AddressSourceConfig::Url {
                url: "new.example.com/ip".to_string(),
                https: false,
                insecure_skip_verify: false,
                regex: None,
                username: Some("user".to_string()),
                password: Some("pass".to_string()),
            })
        );
    }

    #[test]
    fn test_empty_regex_clears_pattern() {
        let mut config = DdnsConfig::new();
        config.address_source = Some(AddressSourceConfig::Url {
            url: "ifconfig.me/ip".to_string(),
            https: true,
            insecure_skip_verify: false,
            regex: Some(r"(\S+)".to_string()),
            username: None,
            password: None,
        });

        apply_env_overrides(&mut config, env(&[("DDNS_URL_REGEX", "")])).unwrap();

        match config.address_source {
            Some(AddressSourceConfig::Url { regex, .. }) => assert!(regex.is_none()),
            other => panic!("unexpected address source: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_values_rejected() {
        let mut config = DdnsConfig::new();
        assert!(apply_env_overrides(&mut config, env(&[("DDNS_RETRY_INTERVAL_SECS", "5s")])).is_err());

        let mut config = DdnsConfig::new();
        assert!(apply_env_overrides(&mut config, env(&[("DDNS_METRICS_ENABLE", "maybe")])).is_err());

        let mut config = DdnsConfig::new();
        assert!(apply_env_overrides(&mut config, env(&[("DDNS_METRICS_PORT", "70000")])).is_err());
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        let mut config = DdnsConfig::new();
        let result = apply_env_overrides(
            &mut config,
            env(&[("DDNS_STATIC_ADDRESS", "10.0.0.1"), ("DDNS_URL", "ifconfig.me")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_url_modifier_without_url_source_rejected() {
        let mut config = DdnsConfig::new();
        let result = apply_env_overrides(&mut config, env(&[("DDNS_URL_REGEX", "(.*)")]));
        assert!(result.is_err());
    }
}
