//! Endpoint catalog: which hosts serve each logical endpoint for each audience

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// One of the alternative host sets for the same logical endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Servers running on this machine
    Local,
    /// The official public deployment
    Official,
    /// The vendor host names the console actually asks for
    Display,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Local => "local",
            Audience::Official => "official",
            Audience::Display => "display",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    /// Logical endpoint name, e.g. "account"
    pub name: String,

    /// Tag the health check must report. Defaults to `name`.
    #[serde(default)]
    pub expected_tag: Option<String>,

    /// Host on this machine
    pub local: String,

    /// Host on the official deployment
    pub official: String,

    /// Vendor host name that gets redirected
    pub display: String,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        local: impl Into<String>,
        official: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            expected_tag: None,
            local: local.into(),
            official: official.into(),
            display: display.into(),
        }
    }

    pub fn host(&self, audience: Audience) -> &str {
        match audience {
            Audience::Local => &self.local,
            Audience::Official => &self.official,
            Audience::Display => &self.display,
        }
    }

    pub fn expected_tag(&self) -> &str {
        self.expected_tag.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    endpoints: Vec<CatalogEntry>,
}

/// Ordered, immutable endpoint table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCatalog {
    entries: Vec<CatalogEntry>,
}

impl EndpointCatalog {
    /// Build a catalog, rejecting duplicate names/tags and empty hosts
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::catalog("catalog must list at least one endpoint"));
        }

        let mut names = HashSet::new();
        let mut displays = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            Self::validate_entry(i, entry)?;
            let ctx = |msg: String| Error::catalog(format!("Endpoint #{}: {}", i + 1, msg));
            if !names.insert(entry.name.as_str()) {
                return Err(ctx(format!("duplicate endpoint name {:?}", entry.name)));
            }
            if !displays.insert(entry.display.as_str()) {
                return Err(ctx(format!("duplicate display host {:?}", entry.display)));
            }
        }

        Ok(Self { entries })
    }

    /// The catalog shipped with the binary
    pub fn builtin() -> Self {
        Self {
            entries: vec![CatalogEntry::new(
                "account",
                "127.0.0.1:8080",
                "account.pretendo.cc",
                "account.nintendo.net",
            )],
        }
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::catalog(format!(
                "Failed to read catalog file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::parse(&content)
    }

    /// Parse a catalog from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| Error::catalog(format!("Invalid TOML: {}", e)))?;
        Self::new(file.endpoints)
    }

    fn validate_entry(index: usize, entry: &CatalogEntry) -> Result<()> {
        let ctx = |msg: &str| Error::catalog(format!("Endpoint #{}: {}", index + 1, msg));

        if entry.name.trim().is_empty() {
            return Err(ctx("`name` must not be empty"));
        }
        for (field, value) in [
            ("local", &entry.local),
            ("official", &entry.official),
            ("display", &entry.display),
        ] {
            if value.trim().is_empty() {
                return Err(ctx(&format!("`{}` host must not be empty", field)));
            }
        }
        if matches!(entry.expected_tag.as_deref(), Some(tag) if tag.is_empty()) {
            return Err(ctx("`expected_tag` must not be empty when given"));
        }

        Ok(())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
