//! Layered configuration: defaults, TOML file, environment, explicit overrides
//!
//! Implementors only supply `validate`; loading and merging are provided in
//! terms of the type's serde representation.

use crate::errors::{MandateError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Prefix for environment overrides. Nested keys use `__` as separator, so
/// `MANDATE_DOMAIN__CHAIN_ID=5` sets `domain.chain_id`.
pub const ENV_PREFIX: &str = "MANDATE_";

/// Core trait for Mandate configuration types
pub trait MandateConfig:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Validate the configuration
    fn validate(&self) -> Result<()>;

    /// Get default configuration values
    fn defaults() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file. Missing keys keep their defaults
    /// when the type uses `#[serde(default)]`.
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            MandateError::invalid(format!(
                "Invalid config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Merge `MANDATE_*` variables from the process environment
    fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge prefixed variables from an explicit source
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(raw) = key.strip_prefix(ENV_PREFIX) {
                let config_key = raw.to_lowercase().replace("__", ".");
                self.set_from_string(&config_key, &value)?;
            }
        }
        Ok(())
    }

    /// Set a configuration value from a string using dot notation (`a.b.c`)
    fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        let tree = toml::Value::try_from(&*self)
            .map_err(|e| MandateError::serialization(e.to_string()))?;
        let scalar = parse_scalar(value);
        // Digits or `true` may still be meant for a string field.
        let retry_as_string = !scalar.is_str();
        *self = match with_value(tree.clone(), key, scalar) {
            Err(err) if retry_as_string => {
                with_value(tree, key, toml::Value::String(value.to_string())).map_err(|_| err)?
            }
            result => result?,
        };
        Ok(())
    }

    /// Defaults, then the file if it exists, then the environment; validated.
    fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            _ => Self::defaults(),
        };
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_scalar(value: &str) -> toml::Value {
    if let Ok(int) = value.parse::<i64>() {
        toml::Value::Integer(int)
    } else if let Ok(flag) = value.parse::<bool>() {
        toml::Value::Boolean(flag)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn with_value<C: DeserializeOwned>(
    mut tree: toml::Value,
    key: &str,
    value: toml::Value,
) -> Result<C> {
    set_nested_value(&mut tree, key, value)?;
    tree.try_into()
        .map_err(|e| MandateError::invalid(format!("Invalid value for {key}: {e}")))
}

fn set_nested_value(tree: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(MandateError::invalid("Empty key"));
    };

    let mut current = tree;
    for part in parents {
        current = current
            .as_table_mut()
            .ok_or_else(|| MandateError::invalid("Expected table"))?
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .ok_or_else(|| MandateError::invalid("Cannot set value on non-table"))?;
    table.insert(last.to_string(), value);
    Ok(())
}
