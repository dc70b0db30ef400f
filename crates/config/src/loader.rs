use std::{fmt::Write, path::Path, str::FromStr};

use anyhow::bail;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::{Config, Role, StorageConfig};

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate(&config)?;

    log::debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    ensure_absolute("guard.login_path", &config.guard.login_path)?;

    for role in Role::PRIORITY {
        let path = config.guard.role_homes.path_for(role);
        ensure_absolute(&format!("guard.role_homes for {role}"), path)?;
    }

    if matches!(&config.session.storage, StorageConfig::File { path } if path.as_os_str().is_empty()) {
        bail!("session.storage.path must not be empty");
    }

    let keys = config.session.keys.all();

    for (i, key) in keys.iter().enumerate() {
        if key.is_empty() {
            bail!("session.keys must not contain empty key names");
        }

        if keys[..i].contains(key) {
            bail!("session.keys uses `{key}` more than once");
        }
    }

    for (path, route) in config.routes.iter() {
        ensure_absolute("route", path)?;

        if let Some(redirect_to) = &route.redirect_to {
            ensure_absolute(&format!("routes.\"{path}\".redirect_to"), redirect_to)?;
        }
    }

    if config.routes.is_empty() {
        log::warn!("No routes configured, every path only requires an authenticated session");
    }

    Ok(())
}

fn ensure_absolute(what: &str, path: &str) -> anyhow::Result<()> {
    if !path.starts_with('/') {
        bail!("{what} must be an absolute path starting with '/', got `{path}`");
    }

    Ok(())
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();

                for segment in path.iter() {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => write!(p, "[{i}]")?,
                    }
                }

                if p.ends_with('.') {
                    p.pop();
                }

                bail!("Failed to expand dynamic string at path '{p}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
