use thiserror::Error;

/// Hard decode failure. No partial result is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdidError {
    /// Structurally invalid input: bad magic, bad checksum, a size out of
    /// range, or a length/offset that would read past the buffer.
    #[error("Malformed data: {0}")]
    Malformed(String),

    /// Well-formed, but outside the versions this decoder understands.
    #[error("Unsupported data: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Malformed,
    Unsupported,
}

impl EdidError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EdidError::Malformed(_) => ErrorKind::Malformed,
            EdidError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        EdidError::Malformed(reason.into())
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        EdidError::Unsupported(reason.into())
    }
}
