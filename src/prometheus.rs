//! Prometheus's own scrape configuration.

use std::collections::HashMap;
use std::path::Path;

use color_eyre::{eyre::Context, Report};
use serde::Deserialize;

pub fn parse_prometheus_config(config_file: impl AsRef<Path>) -> Result<PrometheusConfig, Report> {
    let raw = std::fs::read_to_string(config_file)?;
    parse_prometheus_config_str(&raw)
}

pub fn parse_prometheus_config_str(raw: &str) -> Result<PrometheusConfig, Report> {
    serde_yaml::from_str::<PrometheusConfig>(raw)
        .wrap_err("Prometheus config did not match deserialization struct, or was malformed")
}

#[derive(Clone, Debug, Deserialize)]
pub struct PrometheusConfig {
    pub global: Option<GlobalConfig>,
    #[serde(default)]
    pub scrape_configs: Vec<ScrapeJob>,
}

impl PrometheusConfig {
    pub fn job(&self, name: &str) -> Option<&ScrapeJob> {
        self.scrape_configs.iter().find(|job| job.job_name == name)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GlobalConfig {
    pub scrape_interval: Option<String>,
    pub evaluation_interval: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScrapeJob {
    pub job_name: String,
    #[serde(default)]
    pub static_configs: Vec<StaticConfig>,
}

impl ScrapeJob {
    /// All static targets, flattened across `static_configs` entries.
    pub fn static_targets(&self) -> impl Iterator<Item = &str> {
        self.static_configs
            .iter()
            .flat_map(|sc| sc.targets.iter().map(String::as_str))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StaticConfig {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::parse_prometheus_config_str;

    const CFG: &str = "
global:
  scrape_interval: 15s
scrape_configs:
  - job_name: prometheus
    static_configs:
      - targets: [\"localhost:9090\"]
  - job_name: node_exporter
    static_configs:
      - targets: [\"host.docker.internal:9100\"]
      - targets: [\"192.168.1.20:9100\"]
        labels:
          host: spare
";

    #[test]
    fn job_lookup_by_name() {
        let cfg = parse_prometheus_config_str(CFG).unwrap();
        assert!(cfg.job("node_exporter").is_some());
        assert!(cfg.job("pushgateway").is_none());
    }

    #[test]
    fn targets_flatten_across_static_configs() {
        let cfg = parse_prometheus_config_str(CFG).unwrap();
        let targets: Vec<&str> = cfg.job("node_exporter").unwrap().static_targets().collect();
        assert_eq!(
            targets,
            vec!["host.docker.internal:9100", "192.168.1.20:9100"]
        );
    }
}
