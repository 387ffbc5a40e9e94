//! Error taxonomy for the core. End users only ever see the apology text; these
//! kinds exist for logs and for the health monitor.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// An optional NLP capability is missing or refused to answer.
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Storage read/write failure. Counted by the learning monitor.
    #[error("storage error: {0}")]
    TransientIo(#[from] sled::Error),

    /// A keyword rule points at a knowledge key that does not exist.
    #[error("configuration inconsistency: {0}")]
    ConfigurationInconsistency(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The knowledge file could not be read or parsed.
    #[error("knowledge load failed: {0}")]
    KnowledgeLoad(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Short machine-readable kind used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::CapabilityUnavailable(_) => "capability_unavailable",
            CoreError::TransientIo(_) => "transient_io",
            CoreError::ConfigurationInconsistency(_) => "configuration_inconsistency",
            CoreError::Serialization(_) => "serialization",
            CoreError::KnowledgeLoad(_) => "knowledge_load",
            CoreError::Internal(_) => "internal",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
