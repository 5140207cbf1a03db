use std::time::Duration;

/// Errors produced by the sampling core and its data sources
#[derive(Debug, thiserror::Error)]
pub enum NetViewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to enumerate interfaces: {0}")]
    Interfaces(String),

    #[error("failed to list sockets: {0}")]
    Sockets(String),

    #[error("external ip: {0}")]
    ExternalIp(String),

    #[error("external ip: http {0}")]
    HttpStatus(u16),

    #[error("external ip: empty response")]
    EmptyResponse,

    #[error("external ip: unexpected response {0:?}")]
    InvalidResponse(String),

    #[error("external ip: timed out after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("sampler state poisoned")]
    SamplerPoisoned,
}

pub type Result<T> = std::result::Result<T, NetViewError>;
