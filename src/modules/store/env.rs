//! Environment variable substitution

use once_cell::sync::Lazy;
use regex::Regex;
use sqlblock_core::BlockError;

/// Regex pattern for environment variable placeholders: {{ env.VAR_NAME }}
static ENV_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap()
});

/// Substitutes `{{ env.NAME }}` placeholders; fails when a variable is unset
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSubstitutor;

impl EnvSubstitutor {
    pub fn new() -> Self {
        Self
    }

    /// Substitute environment variables in the given content
    pub fn substitute(&self, content: &str) -> Result<String, BlockError> {
        // Load .env file if present (ignores errors)
        let _ = dotenvy::dotenv();

        let mut missing: Vec<String> = Vec::new();

        let result = ENV_PATTERN.replace_all(content, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing.iter().any(|m| m == var_name) {
                        missing.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });

        if !missing.is_empty() {
            return Err(BlockError::EnvVarNotFound(missing.join(", ")));
        }

        Ok(result.into_owned())
    }
}
