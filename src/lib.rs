//! Redirector - setup tooling for a redirection proxy
//!
//! This crate prepares everything the proxy needs before it can run:
//!
//! - **Server discovery**: probes local and official deployments of each
//!   catalog endpoint and prefers local servers when any of them answer
//! - **Config synthesis**: builds the `config.json` redirection map from probe
//!   results, manual pairs or a named template
//! - **Config persistence**: classifies an existing config and replaces it
//!   atomically
//! - **TLS identity**: issues a self-signed RSA-2048 certificate for the
//!   proxy's HTTPS listener
//!
//! # Example
//!
//! ```no_run
//! use redirector::{
//!     ConfigStore, DataDir, EndpointCatalog, HttpTransport, Prober, DEFAULT_PROBE_TIMEOUT,
//! };
//!
//! fn main() -> redirector::Result<()> {
//!     let catalog = EndpointCatalog::builtin();
//!     let prober = Prober::new(HttpTransport::new(DEFAULT_PROBE_TIMEOUT)?);
//!     let report = prober.probe_all(&catalog)?;
//!     let synthesis = redirector::synth::synthesize(&catalog, &report)?;
//!
//!     let store = ConfigStore::new(DataDir::default().config_path());
//!     store.persist(&synthesis.config, store.classify())?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod layout;
pub mod persist;
pub mod probe;
pub mod prompt;
pub mod store;
pub mod synth;
pub mod tls;
pub mod wizard;

pub use catalog::{Audience, CatalogEntry, EndpointCatalog};
pub use config::{Flags, ProxyConfig};
pub use error::{Error, Result};
pub use layout::DataDir;
pub use probe::{
    HttpReply, HttpTransport, ProbeReport, ProbeResult, Prober, Transport, TransportError,
    DEFAULT_PROBE_TIMEOUT,
};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use store::{ConfigStore, FileStatus, PersistAction};
pub use synth::{Synthesis, Template};
pub use tls::{CertificateIssuer, IssuedCertificate};
pub use wizard::{Outcome, Wizard};
