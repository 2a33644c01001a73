//! The redirection config written to `config.json`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Top-level config document
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Redirections: vendor host -> replacement host
    pub endpoints: BTreeMap<String, String>,

    /// Proxy flags
    pub config: Flags,
}

/// Flags under the `config` key
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Flags {
    #[serde(rename = "decryptOutgoing")]
    pub decrypt_outgoing: bool,

    /// Absent until the certificate step has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<bool>,

    /// Flags this tool does not know about, kept on rewrite
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            decrypt_outgoing: true,
            https: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl ProxyConfig {
    pub fn new(endpoints: BTreeMap<String, String>) -> Self {
        Self {
            endpoints,
            config: Flags::default(),
        }
    }

    /// Parse and structurally validate a config document
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::config(format!("Invalid config: {}", e)))
    }

    /// Pretty JSON with 4-space indentation and a trailing newline
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| Error::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProxyConfig {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(
            "account.nintendo.net".to_string(),
            "127.0.0.1:8080".to_string(),
        );
        ProxyConfig::new(endpoints)
    }

    #[test]
    fn test_pretty_json_layout() {
        let json = sample().to_pretty_json().unwrap();
        let expected = r#"{
    "endpoints": {
        "account.nintendo.net": "127.0.0.1:8080"
    },
    "config": {
        "decryptOutgoing": true
    }
}
"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_https_flag_serialized_once_set() {
        let mut config = sample();
        config.config.https = Some(false);
        let json = config.to_pretty_json().unwrap();
        assert!(json.contains(r#""https": false"#));
    }

    #[test]
    fn test_unknown_flags_survive_round_trip() {
        let json = r#"{"endpoints": {}, "config": {"decryptOutgoing": false, "verbose": 3}}"#;
        let config = ProxyConfig::from_json(json).unwrap();
        assert!(!config.config.decrypt_outgoing);
        assert_eq!(config.config.extra["verbose"], serde_json::json!(3));

        let reparsed = ProxyConfig::from_json(&config.to_pretty_json().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_structural_validation() {
        assert!(ProxyConfig::from_json("{not json").is_err());
        assert!(ProxyConfig::from_json(r#"{"endpoints": {}}"#).is_err());
        assert!(ProxyConfig::from_json(r#"{"config": {"decryptOutgoing": true}}"#).is_err());
        assert!(
            ProxyConfig::from_json(r#"{"endpoints": {"a": 1}, "config": {"decryptOutgoing": true}}"#)
                .is_err()
        );
        assert!(
            ProxyConfig::from_json(r#"{"endpoints": {}, "config": {"decryptOutgoing": "true"}}"#)
                .is_err()
        );
        assert!(ProxyConfig::from_json(
            r#"{"endpoints": {}, "config": {"decryptOutgoing": true}, "extra": 1}"#
        )
        .is_err());
    }
}
