use std::collections::BTreeMap;
use std::path::Path;

/// Loads a `.central.env` file (shell-style `KEY=value` format).
///
/// `.central.env` holds publishing secrets (portal tokens, passwords) that
/// should stay out of version control. Values are available via
/// `${env:VAR}` interpolation in `Central.toml`.
pub fn load_env_file(path: &Path) -> miette::Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content =
        std::fs::read_to_string(path).map_err(centralpub_util::errors::PublishError::Io)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            let value = value.trim().trim_matches('"');
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    Ok(map)
}

/// Interpolate `${env:VAR}` references in a string.
///
/// Looks up values first from the provided `env_overrides` map (populated
/// from `.central.env`), then falls back to actual process environment
/// variables. Unknown keys become empty strings.
pub fn interpolate(input: &str, env_overrides: &BTreeMap<String, String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${env:") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let end = start + end;
        let key = &rest[start + 6..end];
        let value = env_overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .unwrap_or_default();
        result.push_str(&rest[..start]);
        result.push_str(&value);
        rest = &rest[end + 1..];
    }
    result.push_str(rest);
    result
}
