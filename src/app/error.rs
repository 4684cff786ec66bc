use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Landmark '{selector}' did not appear within {timeout_secs}s")]
    LandmarkTimeout { selector: String, timeout_secs: u64 },

    #[error("Could not reach {target} after {attempts} attempts")]
    Connection { target: String, attempts: u32 },

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of why a worker did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Session,
    Connection,
    MissingField,
    InvalidRecord,
    Io,
    Panicked,
    Other,
}

impl HarvestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarvestError::Browser(_) => ErrorKind::Session,
            HarvestError::Navigation(_)
            | HarvestError::LandmarkTimeout { .. }
            | HarvestError::Connection { .. } => ErrorKind::Connection,
            HarvestError::MissingField(_) => ErrorKind::MissingField,
            HarvestError::InvalidRecord(_) => ErrorKind::InvalidRecord,
            HarvestError::Csv(_) | HarvestError::Io(_) => ErrorKind::Io,
            HarvestError::Selector(_) | HarvestError::Config(_) => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            HarvestError::MissingField("title").kind(),
            ErrorKind::MissingField
        );
        assert_eq!(
            HarvestError::Connection {
                target: "https://example.com".into(),
                attempts: 3
            }
            .kind(),
            ErrorKind::Connection
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(HarvestError::from(io).kind(), ErrorKind::Io);
        assert_eq!(
            HarvestError::Browser("launch".into()).kind(),
            ErrorKind::Session
        );
    }

    #[test]
    fn test_display_messages() {
        let err = HarvestError::LandmarkTimeout {
            selector: "#content".into(),
            timeout_secs: 5,
        };
        assert_eq!(
            err.to_string(),
            "Landmark '#content' did not appear within 5s"
        );
        assert_eq!(
            HarvestError::MissingField("url").to_string(),
            "Missing field: url"
        );
    }
}
