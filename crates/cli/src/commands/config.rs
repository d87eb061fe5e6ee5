use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use estimo_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let mut push = |field: &str, value: &str, env_var: Option<&str>| {
        lines.push(render_line(
            field,
            value,
            field_source(field, env_var, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    };

    push("database.url", &config.database.url, Some("ESTIMO_DATABASE_URL"));
    push(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        Some("ESTIMO_DATABASE_MAX_CONNECTIONS"),
    );
    push(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        Some("ESTIMO_DATABASE_TIMEOUT_SECS"),
    );

    push("llm.provider", &format!("{:?}", config.llm.provider), Some("ESTIMO_LLM_PROVIDER"));
    push("llm.model", &config.llm.model, Some("ESTIMO_LLM_MODEL"));
    push(
        "llm.base_url",
        config.llm.base_url.as_deref().unwrap_or("(unset)"),
        Some("ESTIMO_LLM_BASE_URL"),
    );
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|secret| redact_token(secret.expose_secret()))
        .unwrap_or_else(|| "(unset)".to_string());
    push("llm.api_key", &api_key, Some("ESTIMO_LLM_API_KEY"));

    push("server.bind_address", &config.server.bind_address, Some("ESTIMO_SERVER_BIND_ADDRESS"));
    push("server.port", &config.server.port.to_string(), Some("ESTIMO_SERVER_PORT"));

    push("logging.level", &config.logging.level, Some("ESTIMO_LOGGING_LEVEL"));
    push("logging.format", &format!("{:?}", config.logging.format), Some("ESTIMO_LOGGING_FORMAT"));

    lines.join("\n")
}

fn render_line(field: &str, value: &str, source: String) -> String {
    format!("  {field:<28} = {value:<36} [{source}]")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("estimo.toml"), PathBuf::from("config/estimo.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &str,
    env_var: Option<&str>,
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if let Some(env_var) = env_var {
        if env::var(env_var).map(|value| !value.trim().is_empty()).unwrap_or(false) {
            return format!("env:{env_var}");
        }
    }

    if let (Some(doc), Some(path)) = (file_doc, file_path) {
        let mut cursor = Some(doc);
        for part in field.split('.') {
            cursor = cursor.and_then(|value| value.get(part));
        }
        if cursor.is_some() {
            return format!("file:{}", path.display());
        }
    }

    "default".to_string()
}

fn redact_token(token: &str) -> String {
    if token.len() <= 8 {
        "********".to_string()
    } else {
        format!("{}…{}", &token[..4], &token[token.len() - 2..])
    }
}

#[cfg(test)]
mod tests {
    use super::redact_token;

    #[test]
    fn short_tokens_are_fully_masked() {
        assert_eq!(redact_token("abc"), "********");
    }

    #[test]
    fn long_tokens_keep_only_the_edges() {
        let redacted = redact_token("sk-1234567890abcdef");
        assert!(redacted.starts_with("sk-1"));
        assert!(redacted.ends_with("ef"));
        assert!(!redacted.contains("567890"));
    }
}
