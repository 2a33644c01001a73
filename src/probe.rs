//! Reachability probing of candidate servers
//!
//! Each candidate host is asked for `GET http://<host>/isthisworking` and is
//! expected to answer `200` with `{"server": "<tag>"}`. A host that answers
//! with a body that is not that JSON shape is treated as a fatal
//! [`Error::SchemaMismatch`]: it is up, but it is not a compatible server.
//! Every other failure is an ordinary "unreachable".

use serde::Deserialize;
use std::time::Duration;

use crate::catalog::{Audience, CatalogEntry, EndpointCatalog};
use crate::error::{Error, Result};

/// Well-known health check path
pub const HEALTH_PATH: &str = "/isthisworking";

/// Per-probe deadline when none is configured
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A response that made it back over the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Transport-level failure (connect, DNS, timeout, reset)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Minimal blocking HTTP GET, swappable in tests
pub trait Transport {
    fn get(&self, url: &str) -> std::result::Result<HttpReply, TransportError>;
}

/// Blocking reqwest transport with an explicit timeout.
///
/// Health checks go direct; proxy environment variables are ignored.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> std::result::Result<HttpReply, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub endpoint: String,
    pub audience: Audience,
    pub reachable: bool,
    /// Tag the server reported, empty when nothing was parsed
    pub observed_tag: String,
}

/// Results of both probing phases, each in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub local: Vec<ProbeResult>,
    pub official: Vec<ProbeResult>,
}

impl ProbeReport {
    pub fn phase(&self, audience: Audience) -> &[ProbeResult] {
        match audience {
            Audience::Local => &self.local,
            Audience::Official => &self.official,
            Audience::Display => &[],
        }
    }

    pub fn any_reachable(&self, audience: Audience) -> bool {
        self.phase(audience).iter().any(|r| r.reachable)
    }
}

/// Health check body. A JSON object without a `server` string is a server
/// that answered with some other tag, not a parse failure.
#[derive(Deserialize)]
struct HealthBody {
    #[serde(default)]
    server: Option<String>,
}

pub fn health_url(host: &str) -> String {
    format!("http://{}{}", host, HEALTH_PATH)
}

/// Sequential prober over an injected transport
pub struct Prober<T> {
    transport: T,
}

impl<T: Transport> Prober<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Probe one endpoint against one audience
    pub fn probe(&self, entry: &CatalogEntry, audience: Audience) -> Result<ProbeResult> {
        let host = entry.host(audience);
        let url = health_url(host);
        let mut result = ProbeResult {
            endpoint: entry.name.clone(),
            audience,
            reachable: false,
            observed_tag: String::new(),
        };

        let reply = match self.transport.get(&url) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(endpoint = %entry.name, %url, error = %e, "Probe transport error");
                return Ok(result);
            }
        };

        if reply.status != 200 {
            tracing::debug!(endpoint = %entry.name, %url, status = reply.status, "Probe got non-200");
            return Ok(result);
        }
        if reply.body.is_empty() {
            tracing::debug!(endpoint = %entry.name, %url, "Probe got empty body");
            return Ok(result);
        }

        let parsed: HealthBody =
            serde_json::from_str(&reply.body).map_err(|e| Error::SchemaMismatch {
                endpoint: entry.name.clone(),
                host: host.to_string(),
                detail: e.to_string(),
            })?;

        result.observed_tag = parsed.server.unwrap_or_default();
        result.reachable = result.observed_tag == entry.expected_tag();
        tracing::debug!(
            endpoint = %entry.name,
            %url,
            tag = %result.observed_tag,
            reachable = result.reachable,
            "Probe answered"
        );
        Ok(result)
    }

    /// Probe every catalog entry against one audience, in catalog order
    pub fn probe_phase(
        &self,
        catalog: &EndpointCatalog,
        audience: Audience,
    ) -> Result<Vec<ProbeResult>> {
        self.probe_phase_with(catalog, audience, |_, _| {})
    }

    /// Like [`Prober::probe_phase`], calling `on_result` as each probe finishes
    pub fn probe_phase_with<F>(
        &self,
        catalog: &EndpointCatalog,
        audience: Audience,
        mut on_result: F,
    ) -> Result<Vec<ProbeResult>>
    where
        F: FnMut(&CatalogEntry, &ProbeResult),
    {
        let mut results = Vec::with_capacity(catalog.len());
        for entry in catalog.entries() {
            let result = self.probe(entry, audience)?;
            on_result(entry, &result);
            results.push(result);
        }

        tracing::info!(
            audience = %audience,
            reachable = results.iter().filter(|r| r.reachable).count(),
            total = results.len(),
            "Probe phase finished"
        );
        Ok(results)
    }

    /// Run the local phase to completion, then the official phase
    pub fn probe_all(&self, catalog: &EndpointCatalog) -> Result<ProbeReport> {
        let local = self.probe_phase(catalog, Audience::Local)?;
        let official = self.probe_phase(catalog, Audience::Official)?;
        Ok(ProbeReport { local, official })
    }
}
