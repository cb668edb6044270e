use idiom_bridge::IdiomError;

/// Error types for the translation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Provider misconfiguration (missing endpoint, rejected request)
    ConfigError(String),
    /// HTTP transport failure while talking to the model
    NetworkError(String),
    /// The translation model failed to produce a translation
    TranslationError(String),
    /// The request was rejected before translation (e.g. empty text)
    InvalidInput(String),
    /// The model did not answer within the configured deadline
    Timeout(String),
    /// Idiom data could not be loaded
    Idiom(IdiomError),
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            MtError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            MtError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            MtError::Idiom(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MtError::Idiom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IdiomError> for MtError {
    fn from(err: IdiomError) -> Self {
        MtError::Idiom(err)
    }
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MtError::Timeout(err.to_string())
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            MtError::InvalidInput("Empty text".to_string()).to_string(),
            "Invalid input: Empty text"
        );
        assert_eq!(
            MtError::TranslationError("model crashed".to_string()).to_string(),
            "Translation error: model crashed"
        );
    }

    #[test]
    fn test_from_idiom_error_keeps_source() {
        use std::error::Error;

        let err: MtError = IdiomError::ConfigLoad("bad mapping".to_string()).into();
        assert_eq!(err.to_string(), "Idiom dictionary error: bad mapping");
        assert!(err.source().is_some());
    }
}
