//! Grafana provisioning documents: datasources and dashboard providers.

use std::path::Path;

use color_eyre::{
    eyre::{bail, eyre, Context},
    Report,
};
use serde::Deserialize;

pub fn parse_datasources(provisioning_file: impl AsRef<Path>) -> Result<DatasourceFile, Report> {
    let raw = std::fs::read_to_string(provisioning_file)?;
    parse_datasources_str(&raw)
}

pub fn parse_datasources_str(raw: &str) -> Result<DatasourceFile, Report> {
    serde_yaml::from_str::<DatasourceFile>(raw)
        .wrap_err("Datasource provisioning did not match deserialization struct, or was malformed")
}

pub fn parse_providers(provisioning_file: impl AsRef<Path>) -> Result<ProviderFile, Report> {
    let raw = std::fs::read_to_string(provisioning_file)?;
    parse_providers_str(&raw)
}

pub fn parse_providers_str(raw: &str) -> Result<ProviderFile, Report> {
    serde_yaml::from_str::<ProviderFile>(raw)
        .wrap_err("Dashboard provider provisioning did not match deserialization struct, or was malformed")
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatasourceFile {
    #[serde(rename = "apiVersion")]
    pub api_version: Option<u32>,
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

impl DatasourceFile {
    /// The single prometheus-typed datasource.
    ///
    /// A second prometheus entry is a misconfiguration, not a tiebreak.
    pub fn prometheus(&self) -> Result<&Datasource, Report> {
        let mut matches = self
            .datasources
            .iter()
            .filter(|ds| ds.ds_type == "prometheus");
        let first = matches
            .next()
            .ok_or_else(|| eyre!("No prometheus-typed datasource declared"))?;
        if matches.next().is_some() {
            bail!("More than one prometheus-typed datasource declared");
        }
        Ok(first)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Datasource {
    pub name: String,
    #[serde(rename = "type")]
    pub ds_type: String,
    pub url: String,
    pub access: Option<String>,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderFile {
    #[serde(rename = "apiVersion")]
    pub api_version: Option<u32>,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

impl ProviderFile {
    pub fn file_provider(&self) -> Option<&Provider> {
        self.providers.iter().find(|p| p.provider_type == "file")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub options: Option<ProviderOptions>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderOptions {
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::parse_datasources_str;

    #[test]
    fn picks_the_prometheus_entry() {
        let raw = "
apiVersion: 1
datasources:
  - name: Loki
    type: loki
    url: http://loki:3100
  - name: Prometheus
    type: prometheus
    url: http://prometheus:9090
";
        let file = parse_datasources_str(raw).unwrap();
        assert_eq!(file.prometheus().unwrap().url, "http://prometheus:9090");
    }

    #[test]
    fn rejects_missing_or_duplicate_prometheus_entries() {
        let none = parse_datasources_str("datasources: []").unwrap();
        assert!(none.prometheus().is_err());

        let two = parse_datasources_str(
            "
datasources:
  - name: a
    type: prometheus
    url: http://prometheus:9090
  - name: b
    type: prometheus
    url: http://prometheus:9091
",
        )
        .unwrap();
        assert!(two.prometheus().is_err());
    }
}
