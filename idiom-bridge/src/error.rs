/// Error types for loading idiom data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdiomError {
    /// The idiom dictionary is missing or malformed. Fatal at startup.
    ConfigLoad(String),
    /// The parallel corpus is missing or malformed. Recoverable: exact-match
    /// lookup is disabled and translation falls through to the oracle.
    CorpusLoad(String),
}

impl std::fmt::Display for IdiomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdiomError::ConfigLoad(msg) => write!(f, "Idiom dictionary error: {}", msg),
            IdiomError::CorpusLoad(msg) => write!(f, "Parallel corpus error: {}", msg),
        }
    }
}

impl std::error::Error for IdiomError {}

/// Result type for idiom data operations
pub type IdiomResult<T> = Result<T, IdiomError>;
