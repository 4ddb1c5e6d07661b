use std::{fs, path::Path};

use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

/// A browser cookie, as saved between two runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

pub fn save(path: &Path, cookies: &[StoredCookie]) -> Result<()> {
    let json = serde_json::to_string_pretty(cookies).into_diagnostic()?;
    fs::write(path, json)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not write cookies to {}", path.display()))
}

pub fn load(path: &Path) -> Result<Vec<StoredCookie>> {
    let json = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not read cookies from {}", path.display()))?;
    serde_json::from_str(&json)
        .into_diagnostic()
        .wrap_err("Invalid cookies file")
}
