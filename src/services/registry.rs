//! Company name to ticker symbol registry.

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("ticker file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ticker file {path} is not a name-to-symbol mapping: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Immutable mapping from company name to exchange ticker, e.g. `Acme: ACME.NS`.
#[derive(Debug, Clone, Default)]
pub struct TickerRegistry {
    tickers: BTreeMap<String, String>,
}

impl TickerRegistry {
    /// Load the mapping from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path_str.clone(),
            source,
        })?;

        let registry = Self::from_yaml(&content).map_err(|source| RegistryError::Malformed {
            path: path_str.clone(),
            source,
        })?;

        if registry.is_empty() {
            warn!("Ticker file {} contains no companies", path_str);
        } else {
            info!("Loaded {} tickers from {}", registry.len(), path_str);
        }

        Ok(registry)
    }

    /// Parse a YAML mapping. An empty document is an empty registry.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let tickers: Option<BTreeMap<String, String>> = serde_yaml::from_str(content)?;
        Ok(Self {
            tickers: tickers.unwrap_or_default(),
        })
    }

    pub fn from_map(tickers: BTreeMap<String, String>) -> Self {
        Self { tickers }
    }

    /// Case-sensitive exact lookup.
    pub fn lookup(&self, company_name: &str) -> Option<&str> {
        self.tickers.get(company_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TICKERS: &str = "Acme: ACME.NS\nGlobex Corporation: GLOBEX.NS\n";

    #[test]
    fn test_lookup_exact_match() {
        let registry = TickerRegistry::from_yaml(TICKERS).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("Acme"), Some("ACME.NS"));
        assert_eq!(registry.lookup("Globex Corporation"), Some("GLOBEX.NS"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = TickerRegistry::from_yaml(TICKERS).unwrap();
        assert_eq!(registry.lookup("acme"), None);
        assert_eq!(registry.lookup("ACME"), None);
        assert_eq!(registry.lookup("Acme "), None);
    }

    #[test]
    fn test_empty_document() {
        let registry = TickerRegistry::from_yaml("").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_document() {
        assert!(TickerRegistry::from_yaml("- Acme\n- Globex\n").is_err());
        assert!(TickerRegistry::from_yaml("Acme: [ACME.NS, ACME.BO]\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TICKERS.as_bytes()).unwrap();

        let registry = TickerRegistry::load(file.path()).unwrap();
        assert_eq!(registry.lookup("Acme"), Some("ACME.NS"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TickerRegistry::load("/nonexistent/stocks.yaml").unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/stocks.yaml"));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"just a string").unwrap();

        let err = TickerRegistry::load(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Malformed { .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let registry = TickerRegistry::load(file.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_error_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"- Acme\n- Globex\n").unwrap();

        let err = TickerRegistry::load(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
