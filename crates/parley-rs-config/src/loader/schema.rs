//! Schema checks for parley JSON5 configuration.
//!
//! serde alone would silently ignore misspelled keys, so each layer is walked
//! first and rejected on unknown keys or mistyped values.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &[
            "$schema",
            "telegram",
            "ai",
            "memory",
            "commands",
            "workspace",
            "supervisor",
        ],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("telegram") {
        validate_telegram(value, layer, "telegram")?;
    }
    if let Some(value) = map.get("ai") {
        validate_ai(value, layer, "ai")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("commands") {
        validate_commands(value, layer, "commands")?;
    }
    if let Some(value) = map.get("workspace") {
        let map = expect_object(value, layer, "workspace")?;
        ensure_allowed_keys(map, &["root"], layer, "workspace")?;
        if let Some(value) = map.get("root") {
            expect_string(value, layer, "workspace.root")?;
        }
    }
    if let Some(value) = map.get("supervisor") {
        let map = expect_object(value, layer, "supervisor")?;
        ensure_allowed_keys(map, &["restart_delay_secs"], layer, "supervisor")?;
        if let Some(value) = map.get("restart_delay_secs") {
            expect_u64(value, layer, "supervisor.restart_delay_secs")?;
        }
    }
    Ok(())
}

fn validate_telegram(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["token", "api_base", "polling_timeout_secs", "parse_mode"],
        layer,
        path,
    )?;
    if let Some(value) = map.get("token") {
        expect_optional_string(value, layer, &join_path(path, "token"))?;
    }
    if let Some(value) = map.get("api_base") {
        expect_string(value, layer, &join_path(path, "api_base"))?;
    }
    if let Some(value) = map.get("polling_timeout_secs") {
        expect_u64(value, layer, &join_path(path, "polling_timeout_secs"))?;
    }
    if let Some(value) = map.get("parse_mode") {
        let field = join_path(path, "parse_mode");
        match value {
            Value::Null => {}
            Value::String(mode) if matches!(mode.as_str(), "Markdown" | "MarkdownV2" | "HTML") => {}
            _ => {
                return Err(invalid_field(
                    layer,
                    &field,
                    "expected one of Markdown, MarkdownV2, HTML or null",
                ));
            }
        }
    }
    Ok(())
}

fn validate_ai(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "api_key",
            "base_url",
            "model",
            "system_prompt",
            "max_tokens",
            "temperature",
            "timeout_secs",
        ],
        layer,
        path,
    )?;
    if let Some(value) = map.get("api_key") {
        expect_optional_string(value, layer, &join_path(path, "api_key"))?;
    }
    for key in ["base_url", "model", "system_prompt"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["max_tokens", "timeout_secs"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("temperature") {
        expect_f64(value, layer, &join_path(path, "temperature"))?;
    }
    Ok(())
}

fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["path", "max_records", "recall_k", "search_display"],
        layer,
        path,
    )?;
    if let Some(value) = map.get("path") {
        expect_optional_string(value, layer, &join_path(path, "path"))?;
    }
    if let Some(value) = map.get("max_records")
        && !value.is_null()
    {
        expect_u64(value, layer, &join_path(path, "max_records"))?;
    }
    for key in ["recall_k", "search_display"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn validate_commands(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["timeout_secs", "web_results"], layer, path)?;
    for key in ["timeout_secs", "web_results"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_optional_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() || value.is_null() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string or null"))
    }
}

fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
