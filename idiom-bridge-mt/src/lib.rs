//! Hybrid English ↔ Sinhala machine translation
//!
//! Neural translation models render idioms word for word. This crate wraps a
//! model behind [`MachineTranslator`] and keeps curated idioms out of its
//! reach: detected idioms are replaced by placeholder tokens before the model
//! runs and the curated target idioms are put back afterwards.
//!
//! # Workflow Example
//!
//! ```ignore
//! use idiom_bridge::Direction;
//! use idiom_bridge_mt::{HybridPipeline, NllbProvider};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Pick a model
//!     let provider = NllbProvider::from_env()?;
//!
//!     // 2. Load the idiom dictionary and the optional curated corpus
//!     let pipeline = HybridPipeline::from_files(
//!         Path::new("data/idiom_mapping.json"),
//!         Some(Path::new("data/idioms_dataset.json")),
//!         provider,
//!     )?;
//!
//!     // 3. Translate
//!     let result = pipeline
//!         .translate("We need to break the ice before the meeting.", Direction::EnToSi)
//!         .await?;
//!
//!     println!("{} ({}, accuracy {:.2})", result.translation, result.method, result.idiom_accuracy);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mock;
pub mod nllb;
pub mod pipeline;
pub mod placeholder;
pub mod translator;


// Re-export main types for convenient access
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use nllb::{NllbProvider, nllb_code};
pub use pipeline::{HybridPipeline, Method, TranslationResult, idiom_accuracy};
pub use placeholder::{
    IdiomPlaceholder, ProtectedText, Restoration, protect_idioms, restore_idioms, smart_inject,
};
pub use translator::{MachineTranslator, SerializedTranslator};
