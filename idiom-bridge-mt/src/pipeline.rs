//! Hybrid translation pipeline: idiom dictionary + neural model
//!
//! One call to [`HybridPipeline::translate`] runs these stages:
//!
//! 1. **Detect** idioms in the source text
//! 2. **Exact match** (English → Sinhala only): a curated corpus sentence
//!    short-circuits everything else
//! 3. **Protect** detected idioms behind placeholder tokens
//! 4. **Translate** with the neural model
//! 5. **Restore** the target-language idioms, injecting any whose token the
//!    model lost
//! 6. **Score** how many detected idioms made it into the output
//!
//! The pipeline keeps no per-request state; share it behind an `Arc`.

use crate::error::{MtError, MtResult};
use crate::placeholder::{protect_idioms, restore_idioms};
use crate::translator::MachineTranslator;
use idiom_bridge::{
    CorpusStatus, DetectedIdiom, Direction, ExactMatchLookup, IdiomDetector, IdiomPair, Language,
    load_idioms_from_file,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How a translation was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Curated sentence from the parallel corpus
    DatasetMatch,
    /// Neural translation with idiom protection
    Hybrid,
    /// Plain neural translation, no idioms detected
    Nllb,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::DatasetMatch => "dataset_match",
            Method::Hybrid => "hybrid",
            Method::Nllb => "nllb",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub source: String,
    pub translation: String,
    pub source_lang: Language,
    pub target_lang: Language,
    pub detected_idioms: Vec<DetectedIdiom>,
    /// Share of detected idioms whose target rendering appears in the output.
    /// A presence check only, not a positional one.
    pub idiom_accuracy: f64,
    pub method: Method,
}

/// Fraction of `detected` idioms whose `target` rendering appears in `output`
///
/// English targets are compared case-insensitively, Sinhala verbatim.
/// With nothing detected the accuracy is `1.0`.
pub fn idiom_accuracy(detected: &[DetectedIdiom], output: &str, target: Language) -> f64 {
    if detected.is_empty() {
        return 1.0;
    }

    let found = match target {
        Language::Sinhala => detected
            .iter()
            .filter(|idiom| output.contains(idiom.sinhala.as_str()))
            .count(),
        Language::English => {
            let output = output.to_lowercase();
            detected
                .iter()
                .filter(|idiom| output.contains(&idiom.english.to_lowercase()))
                .count()
        }
    };

    found as f64 / detected.len() as f64
}

/// Idiom-aware translator wrapping a neural model
pub struct HybridPipeline {
    detector: IdiomDetector,
    oracle: Box<dyn MachineTranslator>,
    exact_match: ExactMatchLookup,
    oracle_timeout: Option<Duration>,
}

impl HybridPipeline {
    /// Create a pipeline with no exact-match corpus and no model deadline
    pub fn new(detector: IdiomDetector, oracle: impl MachineTranslator + 'static) -> Self {
        Self {
            detector,
            oracle: Box::new(oracle),
            exact_match: ExactMatchLookup::disabled(),
            oracle_timeout: None,
        }
    }

    /// Load the idiom dictionary (and optionally the corpus) from disk
    ///
    /// A bad dictionary is fatal. The corpus is only opened on first lookup,
    /// and a bad corpus merely disables exact matching.
    pub fn from_files(
        idioms_path: &Path,
        corpus_path: Option<&Path>,
        oracle: impl MachineTranslator + 'static,
    ) -> MtResult<Self> {
        let index = load_idioms_from_file(idioms_path)?;
        let pipeline = Self::new(IdiomDetector::new(index), oracle);

        Ok(match corpus_path {
            Some(path) => pipeline.with_exact_match(ExactMatchLookup::from_path(path)),
            None => pipeline,
        })
    }

    pub fn with_exact_match(mut self, lookup: ExactMatchLookup) -> Self {
        self.exact_match = lookup;
        self
    }

    /// Fail model calls that take longer than `timeout`
    ///
    /// The deadline wraps the whole oracle call. For an oracle behind a
    /// [`SerializedTranslator`](crate::translator::SerializedTranslator) that
    /// includes time spent queued; use its own call timeout there instead.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = Some(timeout);
        self
    }

    pub fn detector(&self) -> &IdiomDetector {
        &self.detector
    }

    pub fn provider_name(&self) -> &str {
        self.oracle.provider_name()
    }

    /// Availability of the exact-match corpus (loads it on first call)
    pub fn corpus_status(&self) -> &CorpusStatus {
        self.exact_match.status()
    }

    /// Detect idioms of `language` in `text`
    pub fn detect(&self, text: &str, language: Language) -> Vec<DetectedIdiom> {
        self.detector.detect_in(text, language)
    }

    /// Every idiom pair in the dictionary
    pub fn list_idioms(&self) -> impl Iterator<Item = &IdiomPair> + '_ {
        self.detector.index().all_pairs()
    }

    /// Translate `text` in `direction`
    ///
    /// # Errors
    /// * `MtError::InvalidInput` - `text` is empty or whitespace
    /// * any error from the model, unchanged (no retry)
    /// * `MtError::Timeout` - the model missed the configured deadline
    ///
    /// # Example
    /// ```ignore
    /// let result = pipeline.translate("We need to break the ice.", Direction::EnToSi).await?;
    /// assert_eq!(result.method, Method::Hybrid);
    /// ```
    pub async fn translate(&self, text: &str, direction: Direction) -> MtResult<TranslationResult> {
        if text.trim().is_empty() {
            return Err(MtError::InvalidInput("Empty text".to_string()));
        }

        let source = direction.source();
        let target = direction.target();

        let detected = self.detector.detect_in(text, source);
        tracing::debug!(%direction, idioms = detected.len(), "detected idioms");

        if direction == Direction::EnToSi {
            if let Some(curated) = self.exact_match.find(text) {
                tracing::debug!("exact corpus match, skipping model");
                return Ok(TranslationResult {
                    source: text.to_string(),
                    translation: curated.to_string(),
                    source_lang: source,
                    target_lang: target,
                    detected_idioms: detected,
                    idiom_accuracy: 1.0,
                    method: Method::DatasetMatch,
                });
            }
        }

        let (translation, method) = if detected.is_empty() {
            (self.call_oracle(text, direction).await?, Method::Nllb)
        } else {
            let protected = protect_idioms(self.detector.index(), text, &detected, source)?;
            tracing::debug!(protected = %protected.text, "idioms protected");

            let raw = self.call_oracle(&protected.text, direction).await?;
            let restoration = restore_idioms(&raw, &protected.placeholders);
            for warning in &restoration.warnings {
                tracing::warn!(provider = self.provider_name(), "{}", warning);
            }
            tracing::debug!(
                restored = restoration.restored,
                injected = restoration.injected,
                "idioms restored"
            );

            (restoration.text, Method::Hybrid)
        };

        let accuracy = idiom_accuracy(&detected, &translation, target);

        Ok(TranslationResult {
            source: text.to_string(),
            translation,
            source_lang: source,
            target_lang: target,
            detected_idioms: detected,
            idiom_accuracy: accuracy,
            method,
        })
    }

    async fn call_oracle(&self, text: &str, direction: Direction) -> MtResult<String> {
        let call = self.oracle.translate(text, direction);
        match self.oracle_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                MtError::Timeout(format!(
                    "{} did not answer within {}ms",
                    self.provider_name(),
                    limit.as_millis()
                ))
            })?,
            None => call.await,
        }
    }
}

impl std::fmt::Debug for HybridPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridPipeline")
            .field("idioms", &self.detector.index().len())
            .field("provider", &self.provider_name())
            .field("oracle_timeout", &self.oracle_timeout)
            .finish()
    }
}
