//! `${VAR}` substitution in config values.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are matched, and only in string
//! leaves. `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

static ENV_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error for an unresolvable reference, pointing at the config path it sits
/// under.
#[derive(Debug, thiserror::Error)]
#[error("missing env var `{var_name}` referenced at config path `{config_path}`")]
pub struct MissingEnvVar {
    pub var_name: String,
    pub config_path: String,
}

/// Substitutes `${VAR}` references against the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitutes against a caller-provided map. Tests use this.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    walk(value, env, "")
}

fn walk(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute(s, env, path)?)),
        Value::Array(items) => {
            let out: Result<Vec<_>> = items
                .iter()
                .enumerate()
                .map(|(i, v)| walk(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(out?))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), walk(child, env, &child_path)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_REF.captures_iter(s) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        // `$${VAR}`: the extra dollar escapes the reference.
        if whole.0 > 0 && s.as_bytes()[whole.0 - 1] == b'$' {
            out.push_str(&s[last..whole.0 - 1]);
            out.push_str(&s[whole.0..whole.1]);
            last = whole.1;
            continue;
        }
        out.push_str(&s[last..whole.0]);
        let var_name = &caps[1];
        match env.get(var_name) {
            Some(value) if !value.is_empty() => out.push_str(value),
            _ => bail!(MissingEnvVar {
                var_name: var_name.to_string(),
                config_path: path.to_string(),
            }),
        }
        last = whole.1;
    }
    out.push_str(&s[last..]);
    Ok(out)
}
