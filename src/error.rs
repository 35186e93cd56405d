use std::fmt;

#[derive(Debug)]
pub enum SambaError {
    ValidationError(String),
    TransportError(String),
    UpstreamError { status: u16, body: String },
    DecodeError(String),
}

impl fmt::Display for SambaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SambaError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SambaError::TransportError(msg) => write!(f, "Transport error: {}", msg),
            SambaError::UpstreamError { status, body } => {
                write!(f, "Upstream error: HTTP {} - {}", status, body)
            }
            SambaError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for SambaError {}

pub type Result<T> = std::result::Result<T, SambaError>;
