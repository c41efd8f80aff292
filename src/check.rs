//! Structural checks over the stack's configuration documents.
//!
//! Each check opens one document, parses it, and asserts the invariants the
//! rest of the stack depends on. Checks are independent; a broken document
//! fails its own checks without hiding the others.

use std::path::Path;

use color_eyre::{
    eyre::{bail, eyre, Context},
    Report,
};
use tracing::{error, info};

use crate::compose::{self, Compose};
use crate::dashboard::{self, Dashboard};
use crate::prometheus::{self, PrometheusConfig};
use crate::provisioning::{self, DatasourceFile, ProviderFile};

/// Services the orchestration manifest must declare.
pub const STACK_SERVICES: [&str; 2] = ["prometheus", "grafana"];

pub const NODE_EXPORTER_JOB: &str = "node_exporter";

/// Where Docker Desktop exposes the host-side node_exporter to containers.
pub const NODE_EXPORTER_TARGET: &str = "host.docker.internal:9100";

/// Prometheus's address on the compose network, as Grafana reaches it.
pub const PROMETHEUS_URL: &str = "http://prometheus:9090";

pub const COMPOSE_PATH: &str = "docker-compose.yml";
pub const PROMETHEUS_CONFIG_PATH: &str = "prometheus/prometheus.yml";
pub const DATASOURCE_PATH: &str = "grafana/provisioning/datasources/datasource.yml";
pub const DASHBOARD_PROVIDER_PATH: &str = "grafana/provisioning/dashboards/dashboards.yml";
pub const DASHBOARD_PATH: &str = "grafana/dashboards/macos-host.json";

/// Panel titles the host dashboard must carry.
pub const REQUIRED_PANEL_TITLES: [&str; 5] = [
    "CPU Usage (%)",
    "RAM Available (bytes)",
    "Root Filesystem Free (bytes)",
    "Disk Free by Mountpoint (bytes)",
    "Disk Free by Mountpoint (%)",
];

/// Metrics the dashboard's queries must reference, in aggregate.
pub const REQUIRED_METRICS: [&str; 5] = [
    "node_cpu_seconds_total",
    "node_memory_free_bytes",
    "node_memory_inactive_bytes",
    "node_filesystem_avail_bytes",
    "node_filesystem_size_bytes",
];

pub fn compose_declares_stack(compose: &Compose) -> Result<(), Report> {
    for name in STACK_SERVICES {
        if compose.service(name).is_none() {
            bail!(
                "Orchestration manifest does not declare a {:?} service (found: {:?})",
                name,
                compose.service_names()
            );
        }
    }
    Ok(())
}

pub fn prometheus_scrapes_node_exporter(config: &PrometheusConfig) -> Result<(), Report> {
    let job = config
        .job(NODE_EXPORTER_JOB)
        .ok_or_else(|| eyre!("No scrape job named {:?}", NODE_EXPORTER_JOB))?;
    if job.static_targets().next().is_none() {
        bail!("Scrape job {:?} lists no static targets", NODE_EXPORTER_JOB);
    }
    if !job.static_targets().any(|t| t == NODE_EXPORTER_TARGET) {
        bail!(
            "Scrape job {:?} does not target {:?}",
            NODE_EXPORTER_JOB,
            NODE_EXPORTER_TARGET
        );
    }
    Ok(())
}

pub fn grafana_queries_prometheus(datasources: &DatasourceFile) -> Result<(), Report> {
    let prom = datasources.prometheus()?;
    if prom.url != PROMETHEUS_URL {
        bail!(
            "Prometheus datasource url is {:?}, expected {:?}",
            prom.url,
            PROMETHEUS_URL
        );
    }
    Ok(())
}

pub fn dashboards_are_provisioned(providers: &ProviderFile) -> Result<(), Report> {
    providers
        .file_provider()
        .ok_or_else(|| eyre!("No file-typed dashboard provider declared"))?;
    Ok(())
}

pub fn dashboard_has_required_panels(dashboard: &Dashboard) -> Result<(), Report> {
    for title in REQUIRED_PANEL_TITLES {
        if dashboard.panel(title).is_none() {
            bail!(
                "Dashboard {:?} has no panel titled {:?}",
                dashboard.title,
                title
            );
        }
    }
    Ok(())
}

pub fn dashboard_covers_required_metrics(dashboard: &Dashboard) -> Result<(), Report> {
    let joined = dashboard.query_exprs().collect::<Vec<_>>().join("\n");
    for metric in REQUIRED_METRICS {
        if !joined.contains(metric) {
            bail!(
                "No query in dashboard {:?} references {:?}",
                dashboard.title,
                metric
            );
        }
    }
    Ok(())
}

/// Result of a single configuration check.
pub struct CheckResult {
    pub name: &'static str,
    pub outcome: Result<(), Report>,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run every check against the documents under `stack_dir`.
pub fn run_all(stack_dir: impl AsRef<Path>) -> Vec<CheckResult> {
    let root = stack_dir.as_ref();
    let results = vec![
        CheckResult {
            name: "compose declares the stack services",
            outcome: check_compose(root),
        },
        CheckResult {
            name: "prometheus scrapes the host exporter",
            outcome: check_prometheus(root),
        },
        CheckResult {
            name: "grafana datasource points at prometheus",
            outcome: check_datasources(root),
        },
        CheckResult {
            name: "grafana provisions the dashboards folder",
            outcome: check_providers(root),
        },
        CheckResult {
            name: "host dashboard declares the required panels",
            outcome: check_dashboard_panels(root),
        },
        CheckResult {
            name: "host dashboard queries the required metrics",
            outcome: check_dashboard_metrics(root),
        },
    ];
    for result in &results {
        match &result.outcome {
            Ok(()) => info!(check = result.name, "ok"),
            Err(report) => error!(check = result.name, %report, "failed"),
        }
    }
    results
}

fn check_compose(root: &Path) -> Result<(), Report> {
    let path = root.join(COMPOSE_PATH);
    let manifest = compose::parse_compose(&path)
        .wrap_err_with(|| format!("Loading {}", path.display()))?;
    compose_declares_stack(&manifest)
}

fn check_prometheus(root: &Path) -> Result<(), Report> {
    let path = root.join(PROMETHEUS_CONFIG_PATH);
    let config = prometheus::parse_prometheus_config(&path)
        .wrap_err_with(|| format!("Loading {}", path.display()))?;
    prometheus_scrapes_node_exporter(&config)
}

fn check_datasources(root: &Path) -> Result<(), Report> {
    let path = root.join(DATASOURCE_PATH);
    let datasources = provisioning::parse_datasources(&path)
        .wrap_err_with(|| format!("Loading {}", path.display()))?;
    grafana_queries_prometheus(&datasources)
}

fn check_providers(root: &Path) -> Result<(), Report> {
    let path = root.join(DASHBOARD_PROVIDER_PATH);
    let providers = provisioning::parse_providers(&path)
        .wrap_err_with(|| format!("Loading {}", path.display()))?;
    dashboards_are_provisioned(&providers)
}

fn check_dashboard_panels(root: &Path) -> Result<(), Report> {
    let path = root.join(DASHBOARD_PATH);
    let dashboard = dashboard::parse_dashboard(&path)
        .wrap_err_with(|| format!("Loading {}", path.display()))?;
    dashboard_has_required_panels(&dashboard)
}

fn check_dashboard_metrics(root: &Path) -> Result<(), Report> {
    let path = root.join(DASHBOARD_PATH);
    let dashboard = dashboard::parse_dashboard(&path)
        .wrap_err_with(|| format!("Loading {}", path.display()))?;
    dashboard_covers_required_metrics(&dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::parse_compose_str;
    use crate::dashboard::parse_dashboard_str;

    #[test]
    fn missing_service_is_reported_by_name() {
        let manifest = parse_compose_str(
            "
services:
  prometheus:
    image: \"prom/prometheus:v2.53.0\"
",
        )
        .unwrap();
        let err = compose_declares_stack(&manifest).unwrap_err();
        assert!(err.to_string().contains("grafana"));
    }

    #[test]
    fn metric_coverage_is_aggregated_across_panels() {
        let dashboard = parse_dashboard_str(
            r#"{
                "title": "t",
                "panels": [
                    {"title": "a", "targets": [{"expr": "node_cpu_seconds_total"}]},
                    {"title": "b", "targets": [{"expr": "node_memory_free_bytes + node_memory_inactive_bytes"}]}
                ]
            }"#,
        )
        .unwrap();
        let err = dashboard_covers_required_metrics(&dashboard).unwrap_err();
        assert!(err.to_string().contains("node_filesystem_avail_bytes"));
    }
}
