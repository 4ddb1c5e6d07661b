use std::{fmt::Display, fs, path::Path};

use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Deserializer};

/// An HTTP proxy endpoint of the proxy list file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Proxy {
    pub ip: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
}

impl Proxy {
    /// Read the JSON array of proxies at the given path
    pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Vec<Proxy>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read proxy list {}", path.display()))?;

        serde_json::from_str(&content)
            .into_diagnostic()
            .wrap_err("Proxy list is not a JSON array of {ip, port} objects")
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}

impl Display for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

// Public proxy lists are not consistent about the port type
fn port_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(port) => port.trim().parse().map_err(serde::de::Error::custom),
    }
}
