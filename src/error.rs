#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    #[error("Malformed Input: {0}")]
    MalformedInput(String),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("HTTP Error: {0}")]
    Http(String),
    #[error("Logger Error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl From<toml::de::Error> for OutreachError {
    fn from(e: toml::de::Error) -> Self {
        OutreachError::Config(e.to_string())
    }
}

impl From<ureq::Error> for OutreachError {
    fn from(e: ureq::Error) -> Self {
        OutreachError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OutreachError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::SimpleLogger;

    static LOGGER: SimpleLogger = SimpleLogger;

    #[test]
    fn test_second_logger_is_a_logger_error() {
        // Only this test installs a logger in the unit test binary.
        let _ = log::set_logger(&LOGGER);
        let err: OutreachError = log::set_logger(&LOGGER).unwrap_err().into();
        assert!(matches!(err, OutreachError::Logger(_)));
        assert!(err.to_string().starts_with("Logger Error"));
    }
}
