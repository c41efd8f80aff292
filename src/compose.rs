//! The stack's orchestration manifest.
//!
//! Only the keys the checks care about are modeled; the compose tooling owns
//! the full schema, and unknown keys pass through untouched.
//!
//! ```rust
//! let manifest = "
//! services:
//!   prometheus:
//!     image: \"prom/prometheus:v2.53.0\"
//!     ports:
//!       - \"9090:9090\"
//!   grafana:
//!     image: \"grafana/grafana:11.1.0\"
//! ";
//! let compose = macos_host_monitoring::parse_compose_str(manifest).unwrap();
//! assert!(compose.service("grafana").is_some());
//! ```

use std::collections::HashMap;
use std::path::Path;

use color_eyre::{eyre::Context, Report};
use serde::Deserialize;

pub fn parse_compose(manifest: impl AsRef<Path>) -> Result<Compose, Report> {
    let raw = std::fs::read_to_string(manifest)?;
    parse_compose_str(&raw)
}

pub fn parse_compose_str(raw: &str) -> Result<Compose, Report> {
    serde_yaml::from_str::<Compose>(raw)
        .wrap_err("Orchestration manifest did not match deserialization struct, or was malformed")
}

#[derive(Clone, Debug, Deserialize)]
pub struct Compose {
    pub services: HashMap<String, Service>,
}

impl Compose {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Declared service names, sorted for stable error messages.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
    pub image: Option<String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub volumes: Vec<String>,
}
