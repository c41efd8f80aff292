//! Configuration for a Prometheus + Grafana stack monitoring a macOS host,
//! plus the structural checks that keep those documents honest.
//!
//! The stack itself is declarative: an orchestration manifest, Prometheus's
//! scrape configuration, Grafana's provisioning files, and a dashboard
//! definition. Nothing here runs at deploy time; this crate parses each
//! document into a typed model and verifies the invariants the stack depends
//! on (service names, the host exporter target, the datasource url, the
//! dashboard's panels and metrics).

pub mod check;
pub mod compose;
pub mod dashboard;
pub mod prometheus;
pub mod provisioning;

pub use check::{run_all, CheckResult};
pub use compose::{parse_compose, parse_compose_str, Compose, Service};
pub use dashboard::{parse_dashboard, parse_dashboard_str, Dashboard, Panel, Target};
pub use prometheus::{
    parse_prometheus_config, parse_prometheus_config_str, PrometheusConfig, ScrapeJob,
};
pub use provisioning::{
    parse_datasources, parse_datasources_str, parse_providers, parse_providers_str, Datasource,
    DatasourceFile, Provider, ProviderFile,
};
