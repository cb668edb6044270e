//! Exact-match lookup against a curated parallel corpus
//!
//! Before anything is sent to the neural model, an English sentence is looked
//! up in a small corpus of figurative example sentences with hand-made
//! Sinhala translations. A hit is returned verbatim.
//!
//! The corpus is optional. It is read lazily on first use, at most once, and a
//! missing or corrupt file only disables the lookup; it never fails a
//! translation.

use crate::error::{IdiomError, IdiomResult};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Column names accepted for the English sentence
const ENGLISH_COLUMNS: [&str; 2] = ["english", "Figurative Example"];
/// Column names accepted for the Sinhala sentence
const SINHALA_COLUMNS: [&str; 2] = ["sinhala", "Sinhala Translation Example"];

/// Trim and lowercase, the key used for the exact pass
pub fn normalize_sentence(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Remove everything that is neither a word character nor whitespace
pub fn strip_punctuation(text: &str) -> String {
    PUNCTUATION_RE.replace_all(text, "").into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CorpusEntry {
    stripped: String,
    sinhala: String,
}

/// English → Sinhala sentence pairs, keyed by normalized English
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelCorpus {
    entries: Vec<CorpusEntry>,
    exact: HashMap<String, usize>,
}

impl ParallelCorpus {
    /// Build a corpus from (english, sinhala) rows
    ///
    /// English is normalized with [`normalize_sentence`]. Rows with an empty
    /// side are dropped; a repeated English sentence replaces the earlier
    /// translation.
    pub fn from_rows<I, E, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (E, S)>,
        E: AsRef<str>,
        S: AsRef<str>,
    {
        let mut corpus = ParallelCorpus::default();
        for (english, sinhala) in rows {
            let key = normalize_sentence(english.as_ref());
            let sinhala = sinhala.as_ref().trim();
            if key.is_empty() || sinhala.is_empty() {
                continue;
            }

            let entry = CorpusEntry {
                stripped: strip_punctuation(&key),
                sinhala: sinhala.to_string(),
            };
            match corpus.exact.get(&key) {
                Some(&i) => corpus.entries[i] = entry,
                None => {
                    corpus.exact.insert(key, corpus.entries.len());
                    corpus.entries.push(entry);
                }
            }
        }
        corpus
    }

    /// Parse a JSON array of row objects
    ///
    /// ```json
    /// [
    ///   {"english": "It was a piece of cake.", "sinhala": "ඒක හරිම ලේසි වැඩක්."},
    ///   {"Figurative Example": "...", "Sinhala Translation Example": "..."}
    /// ]
    /// ```
    ///
    /// Header names are matched after trimming. Rows with missing, non-string,
    /// empty or `nan` cells are skipped.
    ///
    /// # Errors
    /// `IdiomError::CorpusLoad` if the text is not JSON or the root is not an array.
    pub fn parse_json(content: &str) -> IdiomResult<Self> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| IdiomError::CorpusLoad(format!("Failed to parse JSON: {}", e)))?;

        let rows = json.as_array().ok_or_else(|| {
            IdiomError::CorpusLoad("Invalid JSON: root must be an array of rows".to_string())
        })?;

        let mut skipped = 0usize;
        let pairs: Vec<(String, String)> = rows
            .iter()
            .filter_map(|row| {
                let pair = row_cell(row, &ENGLISH_COLUMNS).zip(row_cell(row, &SINHALA_COLUMNS));
                if pair.is_none() {
                    skipped += 1;
                }
                pair
            })
            .collect();

        if skipped > 0 {
            tracing::debug!(skipped, "skipped malformed corpus rows");
        }

        Ok(Self::from_rows(pairs))
    }

    /// Curated translation for `text`, if the corpus has it
    ///
    /// Tries the normalized sentence first, then compares punctuation-stripped
    /// forms entry by entry.
    pub fn find(&self, text: &str) -> Option<&str> {
        let key = normalize_sentence(text);
        if let Some(&i) = self.exact.get(&key) {
            return Some(&self.entries[i].sinhala);
        }

        let stripped = strip_punctuation(&key);
        self.entries
            .iter()
            .find(|entry| entry.stripped == stripped)
            .map(|entry| entry.sinhala.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn row_cell(row: &Value, columns: &[&str]) -> Option<String> {
    let obj = row.as_object()?;
    let value = obj
        .iter()
        .find(|(name, _)| columns.contains(&name.trim()))
        .map(|(_, value)| value)?;

    let cell = value.as_str()?.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(cell.to_string())
}

/// Load a corpus file (see [`ParallelCorpus::parse_json`] for the format)
pub fn load_corpus_from_file(path: &Path) -> IdiomResult<ParallelCorpus> {
    let content = fs::read_to_string(path).map_err(|e| {
        IdiomError::CorpusLoad(format!("Failed to read file '{}': {}", path.display(), e))
    })?;
    ParallelCorpus::parse_json(&content)
}

/// Availability of the parallel corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusStatus {
    /// At least one usable sentence pair
    Loaded(ParallelCorpus),
    /// No corpus configured, or the file had no usable rows
    Empty,
    /// The file is missing or corrupt; the reason is kept for diagnostics
    Unavailable(String),
}

impl CorpusStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, CorpusStatus::Loaded(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorpusStatus::Loaded(_) => "loaded",
            CorpusStatus::Empty => "empty",
            CorpusStatus::Unavailable(_) => "unavailable",
        }
    }
}

/// Lazily loaded exact-match lookup
///
/// Safe to share between threads: the first caller loads the corpus and every
/// later caller sees the same result.
#[derive(Debug, Default)]
pub struct ExactMatchLookup {
    path: Option<PathBuf>,
    status: OnceLock<CorpusStatus>,
}

impl ExactMatchLookup {
    /// A lookup that never matches
    pub fn disabled() -> Self {
        Self {
            path: None,
            status: OnceLock::from(CorpusStatus::Empty),
        }
    }

    /// A lookup that reads `path` on first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            status: OnceLock::new(),
        }
    }

    /// A lookup over an already built corpus
    pub fn from_corpus(corpus: ParallelCorpus) -> Self {
        let status = if corpus.is_empty() {
            CorpusStatus::Empty
        } else {
            CorpusStatus::Loaded(corpus)
        };
        Self {
            path: None,
            status: OnceLock::from(status),
        }
    }

    /// Corpus availability, loading it if this is the first call
    pub fn status(&self) -> &CorpusStatus {
        self.status.get_or_init(|| self.load())
    }

    /// Curated Sinhala translation of `text`, if any
    pub fn find(&self, text: &str) -> Option<&str> {
        match self.status() {
            CorpusStatus::Loaded(corpus) => corpus.find(text),
            CorpusStatus::Empty | CorpusStatus::Unavailable(_) => None,
        }
    }

    fn load(&self) -> CorpusStatus {
        let Some(path) = &self.path else {
            return CorpusStatus::Empty;
        };

        match load_corpus_from_file(path) {
            Ok(corpus) if corpus.is_empty() => {
                tracing::warn!(path = %path.display(), "parallel corpus has no usable rows");
                CorpusStatus::Empty
            }
            Ok(corpus) => {
                tracing::info!(
                    path = %path.display(),
                    pairs = corpus.len(),
                    "loaded parallel corpus"
                );
                CorpusStatus::Loaded(corpus)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "parallel corpus not loaded, exact-match lookup disabled"
                );
                CorpusStatus::Unavailable(e.to_string())
            }
        }
    }
}
