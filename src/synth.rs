//! Turning probe results, manual pairs or a template into a [`ProxyConfig`]

use std::collections::BTreeMap;

use crate::catalog::{Audience, EndpointCatalog};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::probe::ProbeReport;

/// A synthesized config and the audience it was built for
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub audience: Audience,
    pub config: ProxyConfig,
}

/// Pick an audience from probe results and map its working endpoints.
///
/// Local servers win whenever any of them answered, otherwise the official
/// deployment is used. Endpoints that failed in the chosen audience are left
/// out of the map entirely.
pub fn synthesize(catalog: &EndpointCatalog, report: &ProbeReport) -> Result<Synthesis> {
    let audience = if report.any_reachable(Audience::Local) {
        Audience::Local
    } else if report.any_reachable(Audience::Official) {
        Audience::Official
    } else {
        return Err(Error::NoServersAvailable);
    };

    let mut endpoints = BTreeMap::new();
    for result in report.phase(audience).iter().filter(|r| r.reachable) {
        if let Some(entry) = catalog.get(&result.endpoint) {
            endpoints.insert(entry.display.clone(), entry.host(audience).to_string());
        }
    }

    tracing::info!(audience = %audience, endpoints = endpoints.len(), "Config synthesized");
    Ok(Synthesis {
        audience,
        config: ProxyConfig::new(endpoints),
    })
}

/// Build a config from (from, to) pairs, stopping at the first pair with an
/// empty side
pub fn from_pairs<I, S>(pairs: I) -> ProxyConfig
where
    I: IntoIterator<Item = (S, S)>,
    S: Into<String>,
{
    let endpoints = pairs
        .into_iter()
        .map(|(from, to)| (from.into(), to.into()))
        .take_while(|(from, to)| !from.is_empty() && !to.is_empty())
        .collect();
    ProxyConfig::new(endpoints)
}

/// Named presets that bypass probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Local,
    Official,
}

impl Template {
    pub fn all() -> &'static [Template] {
        &[Template::Local, Template::Official]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Template::Local => "local server",
            Template::Official => "official servers",
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            Template::Local => Audience::Local,
            Template::Official => Audience::Official,
        }
    }

    /// Every catalog endpoint redirected to this preset's hosts
    pub fn render(&self, catalog: &EndpointCatalog) -> ProxyConfig {
        let audience = self.audience();
        let endpoints = catalog
            .entries()
            .iter()
            .map(|e| (e.display.clone(), e.host(audience).to_string()))
            .collect();
        ProxyConfig::new(endpoints)
    }
}
