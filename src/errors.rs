use thiserror::Error;

/// Configuration failures, rejected before any tensor work happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported activation '{0}', expected 'weighted_tanh'")]
    UnsupportedActivation(String),

    #[error("unsupported model initialization '{0}', expected 'class' or 'sequential'")]
    UnsupportedInitialization(String),
}
