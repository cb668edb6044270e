//! Idiom-aware building blocks for English ↔ Sinhala translation
//!
//! This crate holds everything that does not talk to a translation model:
//!
//! - [`IdiomIndex`]: the curated English → Sinhala idiom dictionary, with
//!   per-language match tables sorted longest idiom first
//! - [`IdiomDetector`]: longest-match, non-overlapping idiom detection in
//!   either language
//! - [`ExactMatchLookup`]: optional sentence-level short-circuit against a
//!   curated parallel corpus
//! - [`language`]: languages, directions and script-based language detection
//!
//! The translation pipeline itself lives in the `idiom-bridge-mt` crate.
//!
//! # Example
//!
//! ```
//! use idiom_bridge::{IdiomDetector, IdiomIndex, Language};
//!
//! let index = IdiomIndex::new([("break the ice", "නිහඬතාව බිඳිනවා")]).unwrap();
//! let detector = IdiomDetector::new(index);
//!
//! let found = detector.detect_in("We need to break the ice.", Language::English);
//! assert_eq!(found[0].sinhala, "නිහඬතාව බිඳිනවා");
//! ```

pub mod corpus;
pub mod detector;
pub mod error;
pub mod index;
pub mod language;
pub mod loader;

pub use corpus::{CorpusStatus, ExactMatchLookup, ParallelCorpus};
pub use detector::{DetectedIdiom, IdiomDetector, Span};
pub use error::{IdiomError, IdiomResult};
pub use index::{IdiomIndex, IdiomPair, IdiomPattern, MatchStrategy, Matcher};
pub use language::{DetectedLanguage, Direction, Language, detect_language};
pub use loader::{load_idioms_from_file, parse_idiom_mapping};
