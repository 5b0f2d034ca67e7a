#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No endpoint is currently in rotation.
    EmptyPool,
    InvalidPolicy(String),
    /// The reconciler needs a Tokio runtime to run on.
    NoRuntime,
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::EmptyPool => write!(f, "server list is empty"),
            PoolError::InvalidPolicy(value) => {
                write!(f, "unsupported selection policy: {value}")
            }
            PoolError::NoRuntime => write!(f, "no Tokio runtime available"),
        }
    }
}

impl std::error::Error for PoolError {}
