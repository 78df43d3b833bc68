use std::fmt;

/// Fatal problems with the input data. Every variant aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Malformed file content: bad headers, wrong field counts, non-numeric tokens
    Format(String),
    /// Inputs that parse but disagree: missing species, block IDs out of range,
    /// empty distributions
    Consistency(String),
    /// Input larger than a fixed bound
    Capacity(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Format(msg) => write!(f, "Format error: {}", msg),
            InputError::Consistency(msg) => write!(f, "Consistency error: {}", msg),
            InputError::Capacity(msg) => write!(f, "Capacity error: {}", msg),
        }
    }
}

impl std::error::Error for InputError {}
