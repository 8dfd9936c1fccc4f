//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use pathmap_core::loader::{find_domain_file, load_domain_from_path, CallbackRegistry};
use pathmap_core::{recurrence, PathMapper};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Where a resolved mapping domain came from
#[derive(Debug, Clone, PartialEq)]
pub enum DomainSource {
    Builtin,
    File(PathBuf),
}

/// Read a JSON or YAML document; `-` reads stdin
pub fn read_document(path: &Path) -> Result<Value> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        // JSON is valid YAML, so one parser covers both on stdin
        return serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON or YAML".to_string(),
        });
    }

    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    tracing::debug!("Read {} bytes from {}", content.len(), path.display());

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}

/// Locate a domain by built-in name, file path or name in the domains directory
pub fn resolve_domain(domain: Option<&str>, config: &Config) -> Result<(PathMapper, DomainSource)> {
    let name = domain
        .or(config.default_domain.as_deref())
        .unwrap_or(recurrence::DOMAIN_NAME);

    if name == recurrence::DOMAIN_NAME {
        tracing::debug!("Using built-in domain '{}'", name);
        return Ok((recurrence::mapper()?.clone(), DomainSource::Builtin));
    }

    let direct = Path::new(name);
    let path = if direct.is_file() {
        direct.to_path_buf()
    } else {
        config
            .domains_dir
            .as_deref()
            .and_then(|dir| find_domain_file(dir, name))
            .ok_or_else(|| Error::DomainNotFound {
                name: name.to_string(),
            })?
    };

    tracing::debug!("Loading domain from {}", path.display());
    let domain = load_domain_from_path(&path, &CallbackRegistry::default())?;
    Ok((PathMapper::new(domain)?, DomainSource::File(path)))
}
