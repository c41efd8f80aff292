//! The host dashboard definition, as Grafana reads it from disk.

use std::path::Path;

use color_eyre::{eyre::Context, Report};
use serde::Deserialize;

pub fn parse_dashboard(dashboard_file: impl AsRef<Path>) -> Result<Dashboard, Report> {
    let raw = std::fs::read_to_string(dashboard_file)?;
    parse_dashboard_str(&raw)
}

pub fn parse_dashboard_str(raw: &str) -> Result<Dashboard, Report> {
    serde_json::from_str::<Dashboard>(raw)
        .wrap_err("Dashboard definition did not match deserialization struct, or was malformed")
}

#[derive(Clone, Debug, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub uid: Option<String>,
    #[serde(default)]
    pub panels: Vec<Panel>,
}

impl Dashboard {
    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.title == title)
    }

    pub fn panel_titles(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|panel| panel.title.as_str())
    }

    /// Every query expression across all panels. Targets without an `expr`
    /// (row placeholders, non-PromQL targets) are skipped.
    pub fn query_exprs(&self) -> impl Iterator<Item = &str> {
        self.panels
            .iter()
            .flat_map(|panel| panel.targets.iter())
            .filter_map(|target| target.expr.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Panel {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub panel_type: Option<String>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Target {
    pub expr: Option<String>,
    #[serde(rename = "refId")]
    pub ref_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::parse_dashboard_str;

    #[test]
    fn exprs_skip_targets_without_one() {
        let raw = r#"{
            "title": "t",
            "panels": [
                {
                    "title": "CPU",
                    "type": "timeseries",
                    "targets": [
                        {"expr": "rate(node_cpu_seconds_total[5m])", "refId": "A"},
                        {"refId": "B"}
                    ]
                },
                {"title": "Notes", "type": "text"}
            ]
        }"#;
        let dashboard = parse_dashboard_str(raw).unwrap();
        let exprs: Vec<&str> = dashboard.query_exprs().collect();
        assert_eq!(exprs, vec!["rate(node_cpu_seconds_total[5m])"]);
    }
}
