//! Server configuration, read from environment variables
//!
//! | Variable              | Default                   |
//! |-----------------------|---------------------------|
//! | `IDIOM_MAPPING_PATH`  | `data/idiom_mapping.json` |
//! | `CORPUS_PATH`         | unset (no exact matching) |
//! | `NLLB_ENDPOINT`       | required unless mocked    |
//! | `IDIOM_BRIDGE_MOCK`   | unset                     |
//! | `BIND_ADDR`           | `127.0.0.1:5000`          |
//! | `ORACLE_TIMEOUT_SECS` | unset (no deadline)       |

use idiom_bridge_mt::{
    HybridPipeline, MachineTranslator, MockMode, MockTranslator, MtError, MtResult, NllbProvider,
    SerializedTranslator,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_IDIOM_MAPPING_PATH: &str = "data/idiom_mapping.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub idioms_path: PathBuf,
    pub corpus_path: Option<PathBuf>,
    pub nllb_endpoint: Option<String>,
    /// Serve with an echo translator instead of the NLLB endpoint
    pub use_mock: bool,
    pub bind_addr: SocketAddr,
    pub oracle_timeout: Option<Duration>,
}

impl WebConfig {
    pub fn from_env() -> MtResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key → value source
    pub fn from_lookup<F>(lookup: F) -> MtResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let use_mock = matches!(
            get("IDIOM_BRIDGE_MOCK").as_deref(),
            Some("1" | "true" | "yes")
        );

        let nllb_endpoint = get("NLLB_ENDPOINT");
        if nllb_endpoint.is_none() && !use_mock {
            return Err(MtError::ConfigError(
                "NLLB_ENDPOINT environment variable not set (or set IDIOM_BRIDGE_MOCK=1)"
                    .to_string(),
            ));
        }

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| MtError::ConfigError(format!("Invalid BIND_ADDR: {}", e)))?;

        let oracle_timeout = get("ORACLE_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| MtError::ConfigError(format!("Invalid ORACLE_TIMEOUT_SECS: {}", e)))
            })
            .transpose()?;

        Ok(Self {
            idioms_path: get("IDIOM_MAPPING_PATH")
                .unwrap_or_else(|| DEFAULT_IDIOM_MAPPING_PATH.to_string())
                .into(),
            corpus_path: get("CORPUS_PATH").map(PathBuf::from),
            nllb_endpoint,
            use_mock,
            bind_addr,
            oracle_timeout,
        })
    }

    /// Load idioms and connect the translation model
    ///
    /// The NLLB client is serialized: the model serves one request at a time,
    /// and `oracle_timeout` only runs while a request holds the model.
    pub fn build_pipeline(&self) -> MtResult<HybridPipeline> {
        let oracle: Arc<dyn MachineTranslator> = match (&self.nllb_endpoint, self.use_mock) {
            (Some(endpoint), false) => Arc::new(serialized(
                NllbProvider::new(endpoint.clone())?,
                self.oracle_timeout,
            )),
            _ => Arc::new(MockTranslator::new(MockMode::NoOp)),
        };

        let pipeline =
            HybridPipeline::from_files(&self.idioms_path, self.corpus_path.as_deref(), oracle)?;

        Ok(match (self.oracle_timeout, self.use_mock) {
            (Some(timeout), true) => pipeline.with_oracle_timeout(timeout),
            _ => pipeline,
        })
    }
}

/// Read the parallel corpus off the async workers, before serving
///
/// Returns the corpus status label.
pub async fn preload_corpus(pipeline: Arc<HybridPipeline>) -> MtResult<&'static str> {
    tokio::task::spawn_blocking(move || pipeline.corpus_status().label())
        .await
        .map_err(|e| MtError::ConfigError(format!("Corpus loading task failed: {}", e)))
}

fn serialized<T: MachineTranslator>(
    inner: T,
    call_timeout: Option<Duration>,
) -> SerializedTranslator<T> {
    let translator = SerializedTranslator::new(inner);
    match call_timeout {
        Some(timeout) => translator.with_call_timeout(timeout),
        None => translator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config(vars: &[(&str, &str)]) -> MtResult<WebConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("NLLB_ENDPOINT", "http://localhost:8000/translate")]).unwrap();
        assert_eq!(config.idioms_path, PathBuf::from("data/idiom_mapping.json"));
        assert_eq!(config.corpus_path, None);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(config.oracle_timeout, None);
        assert!(!config.use_mock);
    }

    #[test]
    fn test_endpoint_required_without_mock() {
        assert!(matches!(config(&[]), Err(MtError::ConfigError(_))));
        assert!(matches!(
            config(&[("NLLB_ENDPOINT", "   ")]),
            Err(MtError::ConfigError(_))
        ));
    }

    #[test]
    fn test_mock_needs_no_endpoint() {
        let config = config(&[("IDIOM_BRIDGE_MOCK", "1")]).unwrap();
        assert!(config.use_mock);
        assert_eq!(config.nllb_endpoint, None);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("IDIOM_BRIDGE_MOCK", "true"),
            ("IDIOM_MAPPING_PATH", "/srv/idioms.json"),
            ("CORPUS_PATH", "/srv/corpus.json"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("ORACLE_TIMEOUT_SECS", "15"),
        ])
        .unwrap();

        assert_eq!(config.idioms_path, PathBuf::from("/srv/idioms.json"));
        assert_eq!(config.corpus_path, Some(PathBuf::from("/srv/corpus.json")));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.oracle_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[("IDIOM_BRIDGE_MOCK", "1"), ("BIND_ADDR", "localhost")]).is_err());
        assert!(config(&[("IDIOM_BRIDGE_MOCK", "1"), ("ORACLE_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_build_pipeline_with_mock() {
        let mut idioms = tempfile::NamedTempFile::new().unwrap();
        write!(idioms, r#"{{"break the ice": "නිහඬතාව බිඳිනවා"}}"#).unwrap();

        let path = idioms.path().to_string_lossy().to_string();
        let config = config(&[("IDIOM_BRIDGE_MOCK", "1"), ("IDIOM_MAPPING_PATH", path.as_str())]).unwrap();
        let pipeline = config.build_pipeline().unwrap();

        assert_eq!(pipeline.list_idioms().count(), 1);
        assert_eq!(pipeline.provider_name(), "Mock Translator");
    }

    #[tokio::test]
    async fn test_queued_requests_do_not_eat_the_model_deadline() {
        use idiom_bridge::{Direction, IdiomDetector};

        let oracle = serialized(
            MockTranslator::with_delay(MockMode::NoOp, 100),
            Some(Duration::from_millis(250)),
        );
        let pipeline = Arc::new(HybridPipeline::new(IdiomDetector::default(), oracle));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move { pipeline.translate("Good morning", Direction::EnToSi).await })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().translation, "Good morning");
        }
    }

    #[tokio::test]
    async fn test_preload_corpus_before_serving() {
        let mut idioms = tempfile::NamedTempFile::new().unwrap();
        write!(idioms, r#"{{"break the ice": "නිහඬතාව බිඳිනවා"}}"#).unwrap();
        let mut corpus = tempfile::NamedTempFile::new().unwrap();
        write!(
            corpus,
            r#"[{{"Figurative Example": "Let us break the ice.", "Sinhala Translation Example": "අපි නිහඬතාව බිඳිමු."}}]"#
        )
        .unwrap();

        let idioms_path = idioms.path().to_string_lossy().to_string();
        let corpus_path = corpus.path().to_string_lossy().to_string();
        let config = config(&[
            ("IDIOM_BRIDGE_MOCK", "1"),
            ("IDIOM_MAPPING_PATH", idioms_path.as_str()),
            ("CORPUS_PATH", corpus_path.as_str()),
        ])
        .unwrap();
        let pipeline = Arc::new(config.build_pipeline().unwrap());

        assert_eq!(preload_corpus(Arc::clone(&pipeline)).await.unwrap(), "loaded");
        // Already loaded: the file is not needed any more
        drop(corpus);
        assert!(pipeline.corpus_status().is_loaded());
    }

    #[tokio::test]
    async fn test_preload_missing_corpus_is_not_fatal() {
        let mut idioms = tempfile::NamedTempFile::new().unwrap();
        write!(idioms, r#"{{"break the ice": "නිහඬතාව බිඳිනවා"}}"#).unwrap();

        let idioms_path = idioms.path().to_string_lossy().to_string();
        let config = config(&[
            ("IDIOM_BRIDGE_MOCK", "1"),
            ("IDIOM_MAPPING_PATH", idioms_path.as_str()),
            ("CORPUS_PATH", "/nonexistent/corpus.json"),
        ])
        .unwrap();
        let pipeline = Arc::new(config.build_pipeline().unwrap());

        assert_eq!(preload_corpus(pipeline).await.unwrap(), "unavailable");
    }

    #[test]
    fn test_build_pipeline_missing_dictionary() {
        let config = config(&[
            ("IDIOM_BRIDGE_MOCK", "1"),
            ("IDIOM_MAPPING_PATH", "/nonexistent/idioms.json"),
        ])
        .unwrap();
        assert!(matches!(config.build_pipeline(), Err(MtError::Idiom(_))));
    }
}
