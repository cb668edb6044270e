//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the pipeline can run against a remote NLLB model, a mock, or anything
//! else that turns text in one language into text in the other.
//!
//! # Example
//!
//! ```ignore
//! use idiom_bridge::Direction;
//! use idiom_bridge_mt::{MachineTranslator, NllbProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = NllbProvider::from_env()?;
//!     let result = provider.translate("Good morning", Direction::EnToSi).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use async_trait::async_trait;
use idiom_bridge::Direction;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Generic trait for machine translation providers
///
/// The pipeline treats implementations as black boxes: text goes in, raw
/// translated text comes out. Errors are passed to the caller untouched.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate `text` in the given direction
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The raw translated text
    /// * `Err(MtError)` - If translation fails
    async fn translate(&self, text: &str, direction: Direction) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T: MachineTranslator + ?Sized> MachineTranslator for Arc<T> {
    async fn translate(&self, text: &str, direction: Direction) -> MtResult<String> {
        (**self).translate(text, direction).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Wraps a provider so that only one translation runs at a time
///
/// For models that hold device state and cannot serve concurrent requests.
/// Callers queue on an async mutex instead of blocking a thread.
pub struct SerializedTranslator<T> {
    inner: T,
    gate: Mutex<()>,
    call_timeout: Option<Duration>,
}

impl<T: MachineTranslator> SerializedTranslator<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
            call_timeout: None,
        }
    }

    /// Fail a model call that runs longer than `timeout`
    ///
    /// The clock starts once the call holds the gate, so time spent queued
    /// behind other requests does not count.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: MachineTranslator> MachineTranslator for SerializedTranslator<T> {
    async fn translate(&self, text: &str, direction: Direction) -> MtResult<String> {
        let _guard = self.gate.lock().await;
        let call = self.inner.translate(text, direction);
        match self.call_timeout {
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

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockMode, MockTranslator};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records the highest number of calls seen in flight at once
    #[derive(Default)]
    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl MachineTranslator for ConcurrencyProbe {
        async fn translate(&self, text: &str, _direction: Direction) -> MtResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(text.to_string())
        }

        fn provider_name(&self) -> &str {
            "Probe"
        }
    }

    struct Failing;

    #[async_trait]
    impl MachineTranslator for Failing {
        async fn translate(&self, _text: &str, _direction: Direction) -> MtResult<String> {
            Err(MtError::TranslationError("device lost".to_string()))
        }

        fn provider_name(&self) -> &str {
            "Failing"
        }
    }

    #[tokio::test]
    async fn test_serialized_translator_runs_one_call_at_a_time() {
        let translator = Arc::new(SerializedTranslator::new(ConcurrencyProbe::default()));

        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let translator = Arc::clone(&translator);
                tokio::spawn(async move {
                    translator
                        .translate(&format!("text {}", i), Direction::EnToSi)
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(translator.inner().peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_serialized_translator_passes_errors_through() {
        let translator = SerializedTranslator::new(Failing);
        let err = translator.translate("hello", Direction::EnToSi).await.unwrap_err();
        assert_eq!(err, MtError::TranslationError("device lost".to_string()));
        assert_eq!(translator.provider_name(), "Failing");
    }

    #[tokio::test]
    async fn test_call_timeout_ignores_time_spent_queued() {
        let translator = Arc::new(
            SerializedTranslator::new(MockTranslator::with_delay(MockMode::NoOp, 100))
                .with_call_timeout(Duration::from_millis(250)),
        );

        // The last of four 100ms calls finishes ~400ms after the first starts
        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let translator = Arc::clone(&translator);
                tokio::spawn(async move {
                    translator
                        .translate(&format!("text {}", i), Direction::EnToSi)
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(translator.inner().call_count(), 4);
    }

    #[tokio::test]
    async fn test_call_timeout_fails_slow_call() {
        let translator = SerializedTranslator::new(MockTranslator::with_delay(MockMode::NoOp, 200))
            .with_call_timeout(Duration::from_millis(20));

        match translator.translate("hello", Direction::EnToSi).await {
            Err(MtError::Timeout(msg)) => assert!(msg.contains("within 20ms")),
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_arc_delegates() {
        let translator: Arc<dyn MachineTranslator> = Arc::new(ConcurrencyProbe::default());
        let result = translator.translate("hi", Direction::SiToEn).await.unwrap();
        assert_eq!(result, "hi");
        assert_eq!(translator.provider_name(), "Probe");
    }
}
