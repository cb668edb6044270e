//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, model-free translator for testing
//! the hybrid pipeline without an inference server.
//!
//! # Example
//!
//! ```ignore
//! use idiom_bridge::Direction;
//! use idiom_bridge_mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", Direction::EnToSi).await.unwrap();
//!     assert_eq!(result, "hello_si");
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::placeholder::PLACEHOLDER_RE;
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use idiom_bridge::Direction;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target language suffix: "hello" → "hello_si"
    /// Placeholders survive untouched
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, direction) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, Direction), String>),

    /// Reverse the order of whitespace-separated words
    /// (simulates a language with different word order)
    Reorder,

    /// Always answer with the same text, whatever the input
    Fixed(String),

    /// Drop every idiom placeholder and squeeze the remaining whitespace,
    /// like a model that "eats" tokens it does not understand
    StripPlaceholders,

    /// Simulate model errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share the call counter, so a test can hand one clone to the
/// pipeline and inspect [`MockTranslator::call_count`] on another.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated inference delay (in milliseconds)
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockTranslator with simulated inference delay
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::NoOp, 50);
    /// // Each translation will take ~50ms
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Number of `translate` calls made so far, across all clones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, direction: Direction) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, direction.target())),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), direction);
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, direction.target())))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().rev().collect();
                Ok(words.join(" "))
            }
            MockMode::Fixed(output) => Ok(output.clone()),
            MockMode::StripPlaceholders => {
                let stripped = PLACEHOLDER_RE.replace_all(text, " ");
                Ok(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(&self, text: &str, direction: Direction) -> MtResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        self.apply_translation(text, direction)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
