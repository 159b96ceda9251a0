use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The variable is set but unreadable (e.g. not unicode)
    #[error("Environment variable error for {key}: {source}")]
    EnvVar {
        key: String,
        #[source]
        source: VarError,
    },

    /// The value (or its default) does not parse into the target type
    #[error("Parse error: could not parse {key}: {reason}")]
    Parse { key: String, reason: String },
}
