use std::time::Duration;

#[derive(Debug)]
pub enum IngestError {
    Io(std::io::Error),
    File {
        path: String,
        source: std::io::Error,
    },
    InvalidUri(String),
    UnsupportedScheme(String),
    Request(reqwest::Error),
    Status(u16),
    Timeout(Duration),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io(err) => write!(f, "read failed: {err}"),
            IngestError::File { path, source } => {
                write!(f, "failed to read server list '{path}': {source}")
            }
            IngestError::InvalidUri(uri) => write!(f, "invalid url: {uri}"),
            IngestError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported url scheme: {scheme}")
            }
            IngestError::Request(err) => write!(f, "request failed: {err}"),
            IngestError::Status(status) => write!(f, "unexpected status: {status}"),
            IngestError::Timeout(timeout) => write!(f, "fetch timed out after {timeout:?}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(err) => Some(err),
            IngestError::File { source, .. } => Some(source),
            IngestError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err)
    }
}
