use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read attributes file {path}: {source}")]
    AttributesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse attributes file: {0}")]
    AttributesFileParse(#[from] serde_yaml::Error),

    #[error("invalid value \"{value}\" for {field}")]
    InvalidValue { field: &'static str, value: String },
}
